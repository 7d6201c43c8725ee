//! Task command handlers.

use anyhow::{Result, bail};
use comfy_table::{ContentArrangement, Table};
use toco_core::api::{Task, TaskPatch};
use toco_core::tasks::{self, TaskFilter, TaskList};

use super::Ctx;

pub async fn list(ctx: &mut Ctx, filter: TaskFilter) -> Result<()> {
    ctx.require_auth().await?;

    let mut vm = TaskList::new();
    vm.load(&ctx.api, &mut ctx.session).await?;

    let visible = vm.filtered(filter);
    if visible.is_empty() {
        match filter {
            TaskFilter::All => println!("No tasks."),
            TaskFilter::Active => println!("No active tasks."),
            TaskFilter::Completed => println!("No completed tasks."),
        }
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "", "Title", "Created"]);
    for task in &visible {
        table.add_row(vec![
            short_id(&task.id),
            marker(task).to_string(),
            task.title.clone(),
            task.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{table}");
    println!("{} tasks, {} completed", vm.len(), vm.completed_count());

    Ok(())
}

pub async fn add(ctx: &mut Ctx, title: &str, description: Option<&str>) -> Result<()> {
    ctx.require_auth().await?;

    let mut vm = TaskList::new();
    let task = vm
        .create(&ctx.api, &mut ctx.session, title, description)
        .await?;

    println!("Added {}  {}", short_id(&task.id), task.title);
    Ok(())
}

pub async fn show(ctx: &mut Ctx, id: &str) -> Result<()> {
    ctx.require_auth().await?;

    let mut vm = TaskList::new();
    vm.load(&ctx.api, &mut ctx.session).await?;
    let id = resolve_id(&vm, id)?;

    let task = tasks::fetch(&ctx.api, &mut ctx.session, &id).await?;
    print_task(&task);
    Ok(())
}

pub async fn set_completed(ctx: &mut Ctx, id: &str, completed: bool) -> Result<()> {
    ctx.require_auth().await?;

    let mut vm = TaskList::new();
    vm.load(&ctx.api, &mut ctx.session).await?;
    let id = resolve_id(&vm, id)?;

    let task = vm
        .set_completed(&ctx.api, &mut ctx.session, &id, completed)
        .await?;
    print_transition(&task);
    Ok(())
}

pub async fn toggle(ctx: &mut Ctx, id: &str) -> Result<()> {
    ctx.require_auth().await?;

    let mut vm = TaskList::new();
    vm.load(&ctx.api, &mut ctx.session).await?;
    let id = resolve_id(&vm, id)?;

    let task = vm.toggle(&ctx.api, &mut ctx.session, &id).await?;
    print_transition(&task);
    Ok(())
}

pub async fn edit(
    ctx: &mut Ctx,
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    ctx.require_auth().await?;

    let mut vm = TaskList::new();
    vm.load(&ctx.api, &mut ctx.session).await?;
    let id = resolve_id(&vm, id)?;

    let patch = TaskPatch {
        title: title.map(str::to_string),
        description: description.map(str::to_string),
        completed: None,
    };
    let task = vm.update(&ctx.api, &mut ctx.session, &id, patch).await?;

    println!("Updated {}  {}", short_id(&task.id), task.title);
    Ok(())
}

pub async fn rm(ctx: &mut Ctx, id: &str) -> Result<()> {
    ctx.require_auth().await?;

    let mut vm = TaskList::new();
    vm.load(&ctx.api, &mut ctx.session).await?;
    let id = resolve_id(&vm, id)?;
    let title = vm.get(&id).map(|t| t.title.clone());

    vm.delete(&ctx.api, &mut ctx.session, &id).await?;

    match title {
        Some(title) => println!("Deleted {}  {}", short_id(&id), title),
        None => println!("Deleted {}", short_id(&id)),
    }
    Ok(())
}

/// Expands a unique id prefix to the full id. Ids with no match pass
/// through unchanged so the server can report them.
fn resolve_id(vm: &TaskList, raw: &str) -> Result<String> {
    if vm.get(raw).is_some() {
        return Ok(raw.to_string());
    }

    let matches: Vec<&str> = vm
        .tasks()
        .iter()
        .filter(|t| t.id.starts_with(raw))
        .map(|t| t.id.as_str())
        .collect();

    match matches.as_slice() {
        [] => Ok(raw.to_string()),
        [id] => Ok((*id).to_string()),
        _ => bail!("Task id '{raw}' is ambiguous ({} matches)", matches.len()),
    }
}

fn print_task(task: &Task) {
    println!("{}", task.title);
    println!("ID:      {}", task.id);
    if task.completed {
        let done = task
            .completed_at
            .map_or_else(|| "yes".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
        println!("Status:  completed ({done})");
    } else {
        println!("Status:  active");
    }
    println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(description) = &task.description {
        println!();
        println!("{description}");
    }
}

fn print_transition(task: &Task) {
    if task.completed {
        println!("Completed {}  {}", short_id(&task.id), task.title);
    } else {
        println!("Reopened {}  {}", short_id(&task.id), task.title);
    }
}

fn marker(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
