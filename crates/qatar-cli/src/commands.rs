use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use qatar_queue::{Identifier, Item, Queue};

use crate::cli::*;

pub fn run_command(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match cli.command {
        Command::Create(args) => cmd_create(args, out),
        Command::Count(args) => cmd_count(args, out),
        Command::Enq(args) => cmd_enq(args, out),
        Command::Deq(args) => cmd_deq(args, out),
        Command::Del(args) => cmd_del(args),
        Command::Ls(args) => cmd_ls(args, out),
    }
}

fn queue_dir(args: &QueueArgs) -> anyhow::Result<&Path> {
    args.queue
        .as_deref()
        .context("queue directory is required (-q <dir>)")
}

fn open_queue(args: &QueueArgs) -> anyhow::Result<Queue> {
    let dir = queue_dir(args)?;
    Queue::open(dir).with_context(|| format!("cannot open queue at {}", dir.display()))
}

fn parse_id(s: &str) -> anyhow::Result<Identifier> {
    s.parse().with_context(|| format!("bad identifier {s:?}"))
}

fn print_item(out: &mut dyn Write, item: &Item) -> anyhow::Result<()> {
    writeln!(out, "{}: {:?}", item.id, item.data_lossy())?;
    Ok(())
}

fn cmd_create(args: QueueArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let dir = queue_dir(&args)?;
    let queue =
        Queue::create(dir).with_context(|| format!("cannot create queue at {}", dir.display()))?;
    queue.close()?;
    writeln!(out, "{} Created queue in {}", "✓".green().bold(), dir.display())?;
    Ok(())
}

fn cmd_count(args: QueueArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let queue = open_queue(&args)?;
    let n = queue.count()?;
    queue.close()?;
    writeln!(out, "{n}")?;
    Ok(())
}

fn cmd_enq(args: EnqArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let queue = open_queue(&args.queue)?;
    let id = queue.enqueue(args.data.as_bytes())?;
    queue.close()?;
    writeln!(out, "{id}")?;
    Ok(())
}

fn cmd_deq(args: QueueArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let queue = open_queue(&args)?;
    let item = queue.dequeue()?;
    queue.close()?;
    if let Some(item) = item {
        print_item(out, &item)?;
    }
    Ok(())
}

fn cmd_del(args: DelArgs) -> anyhow::Result<()> {
    let queue = open_queue(&args.queue)?;
    for raw in &args.ids {
        let id = parse_id(raw)?;
        queue.delete(id).with_context(|| format!("cannot delete {id}"))?;
    }
    queue.close()?;
    Ok(())
}

fn cmd_ls(args: LsArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let queue = open_queue(&args.queue)?;
    let items = match args.after.as_deref() {
        Some(raw) => queue.peek_multi_after(args.count, parse_id(raw)?)?,
        None => queue.peek_multi(args.count)?,
    };
    queue.close()?;
    for item in &items {
        if args.show {
            print_item(out, item)?;
        } else {
            writeln!(out, "{}", item.id)?;
        }
    }
    Ok(())
}
