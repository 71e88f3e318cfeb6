use crate::models::catalog::{Category, Genre};
use crate::models::comment::Comment;
use crate::models::review::Review;
use crate::models::title::Title;
use crate::models::user::User;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// One durable mutation. Serialized as a JSON line; full records are
/// logged so replay never needs a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WalOperation {
    AddUser { user: User },
    UpdateUser { user: User },
    RemoveUser { username: String },
    AddGenre { genre: Genre },
    RemoveGenre { slug: String },
    AddCategory { category: Category },
    RemoveCategory { slug: String },
    AddTitle { title: Title },
    UpdateTitle { title: Title },
    RemoveTitle { id: u64 },
    AddReview { review: Review },
    UpdateReview { review: Review },
    RemoveReview { id: u64 },
    AddComment { comment: Comment },
    UpdateComment { comment: Comment },
    RemoveComment { id: u64 },
}

/// Append-only log of store mutations, replayed at startup to rebuild
/// the in-memory state.
pub struct Wal {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl Wal {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open WAL file")?;

        Ok(Wal {
            file: Arc::new(Mutex::new(file)),
            path,
        })
    }

    pub fn log_operation(&self, op: WalOperation) -> Result<()> {
        let line = serde_json::to_string(&op).context("Failed to serialize WAL operation")?;
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", line).context("Failed to write to WAL")?;
        file.flush().context("Failed to flush WAL")?;
        Ok(())
    }

    pub fn replay(&self) -> Result<Vec<WalOperation>> {
        let file = File::open(&self.path).context("Failed to open WAL for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from WAL")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let op: WalOperation = serde_json::from_str(line)
                .with_context(|| format!("Invalid WAL entry at line {}", line_num + 1))?;
            operations.push(op);
        }

        Ok(operations)
    }
}
