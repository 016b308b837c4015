use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "qatar",
    about = "qatar: a persistent FIFO queue in a directory",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new, empty queue
    Create(QueueArgs),
    /// Print the number of queued items
    Count(QueueArgs),
    /// Enqueue a string and print its identifier
    Enq(EnqArgs),
    /// Dequeue the front item and print it
    Deq(QueueArgs),
    /// Delete items by identifier
    Del(DelArgs),
    /// List items from the front of the queue
    Ls(LsArgs),
}

#[derive(Args)]
pub struct QueueArgs {
    /// Queue directory
    #[arg(short = 'q', long = "queue")]
    pub queue: Option<PathBuf>,
}

#[derive(Args)]
pub struct EnqArgs {
    #[command(flatten)]
    pub queue: QueueArgs,
    pub data: String,
}

#[derive(Args)]
pub struct DelArgs {
    #[command(flatten)]
    pub queue: QueueArgs,
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct LsArgs {
    #[command(flatten)]
    pub queue: QueueArgs,
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,
    /// Print payloads next to identifiers
    #[arg(short = 's', long)]
    pub show: bool,
    /// Start listing at this identifier (inclusive)
    #[arg(long)]
    pub after: Option<String>,
}
