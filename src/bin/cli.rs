use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fs;

#[derive(Parser)]
#[command(name = "taskboard-cli")]
#[command(about = "CLI for the taskboard API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    Signup {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Profile,
    Boards,
    CreateBoard {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: String,
        #[arg(short, long, default_value = "other")]
        category: String,
    },
    DeleteBoard {
        #[arg(short, long)]
        id: String,
    },
    Columns {
        #[arg(short, long)]
        board: String,
    },
    CreateColumn {
        #[arg(short, long)]
        board: String,
        #[arg(short, long)]
        title: String,
    },
    MoveColumn {
        #[arg(short, long)]
        id: String,
        #[arg(short = 'o', long)]
        target_order: i64,
    },
    DeleteColumn {
        #[arg(short, long)]
        id: String,
    },
    CreateCard {
        #[arg(short, long)]
        board: String,
        #[arg(short = 'c', long)]
        column: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    MoveCard {
        #[arg(short, long)]
        id: String,
        #[arg(short = 'c', long)]
        target_column: String,
        #[arg(short = 'o', long)]
        target_order: i64,
    },
    Assign {
        #[arg(short, long)]
        card: String,
        #[arg(short, long)]
        assignee: String,
    },
    DeleteCard {
        #[arg(short, long)]
        id: String,
    },
    Comment {
        #[arg(short, long)]
        card: String,
        #[arg(short, long)]
        text: String,
    },
    Comments {
        #[arg(short, long)]
        card: String,
    },
    Invite {
        #[arg(short, long)]
        board: String,
        #[arg(short, long)]
        to: String,
    },
    Invitations,
    Accept {
        #[arg(short, long)]
        id: String,
    },
    Reject {
        #[arg(short, long)]
        id: String,
    },
    Activities,
    Logout,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

const TOKEN_FILE: &str = ".taskboard_token";

fn token() -> String {
    fs::read_to_string(TOKEN_FILE).unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();
    let base = cli.url;

    match cli.command {
        Commands::Signup { name, email, password } => {
            let res = client.post(format!("{base}/api/users/signup"))
                .json(&json!({ "name": name, "email": email, "password": password }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Login { email, password } => {
            let res = client.post(format!("{base}/api/users/login"))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            if res.status().is_success() {
                let body: LoginResponse = res.json().await?;
                fs::write(TOKEN_FILE, body.token)?;
                println!("Logged in. Token saved to {TOKEN_FILE}");
            } else {
                println!("Login failed: {}", res.text().await?);
            }
        }
        Commands::Profile => {
            let res = client.get(format!("{base}/api/users/profile"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Boards => {
            let res = client.get(format!("{base}/api/boards/get-all"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::CreateBoard { title, description, category } => {
            let res = client.post(format!("{base}/api/boards/create-board"))
                .bearer_auth(token())
                .json(&json!({ "title": title, "description": description, "category": category }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::DeleteBoard { id } => {
            let res = client.delete(format!("{base}/api/boards/{id}"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Columns { board } => {
            let res = client.get(format!("{base}/api/columns/get-all/{board}"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::CreateColumn { board, title } => {
            let res = client.post(format!("{base}/api/columns/create-column"))
                .bearer_auth(token())
                .json(&json!({ "title": title, "boardId": board }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::MoveColumn { id, target_order } => {
            let res = client.patch(format!("{base}/api/columns/move-column/{id}"))
                .bearer_auth(token())
                .json(&json!({ "targetOrder": target_order }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::DeleteColumn { id } => {
            let res = client.delete(format!("{base}/api/columns/{id}"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::CreateCard { board, column, title, description } => {
            let res = client.post(format!("{base}/api/cards/create-card"))
                .bearer_auth(token())
                .json(&json!({
                    "title": title,
                    "description": description,
                    "boardId": board,
                    "columnId": column,
                }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::MoveCard { id, target_column, target_order } => {
            let res = client.patch(format!("{base}/api/cards/move-card/{id}"))
                .bearer_auth(token())
                .json(&json!({ "targetColumnId": target_column, "targetOrder": target_order }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Assign { card, assignee } => {
            let res = client.patch(format!("{base}/api/cards/add-assignee/{card}"))
                .bearer_auth(token())
                .json(&json!({ "assigneeId": assignee }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::DeleteCard { id } => {
            let res = client.delete(format!("{base}/api/cards/{id}"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Comment { card, text } => {
            let res = client.post(format!("{base}/api/comments/create-comment"))
                .bearer_auth(token())
                .json(&json!({ "text": text, "cardId": card }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Comments { card } => {
            let res = client.get(format!("{base}/api/comments/{card}"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Invite { board, to } => {
            let res = client.post(format!("{base}/api/invitations/send"))
                .bearer_auth(token())
                .json(&json!({ "toUserId": to, "boardId": board }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Invitations => {
            let res = client.get(format!("{base}/api/invitations"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Accept { id } => {
            let res = client.post(format!("{base}/api/invitations/{id}/accept"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Reject { id } => {
            let res = client.post(format!("{base}/api/invitations/{id}/reject"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Activities => {
            let res = client.get(format!("{base}/api/activities"))
                .bearer_auth(token())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Logout => {
            let _ = fs::remove_file(TOKEN_FILE);
            println!("Logged out (token removed).");
        }
    }

    Ok(())
}
