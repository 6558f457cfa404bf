//! Component listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use cithrus_components::{ComponentDescriptor, ComponentRegistry};
use clap::Args;

#[derive(Args)]
pub struct ComponentsArgs {
    /// Show details for a specific component
    #[arg(value_name = "COMPONENT")]
    component: Option<String>,

    /// Print descriptors as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ComponentsArgs) -> anyhow::Result<()> {
    let registry = ComponentRegistry::new();

    if let Some(id) = &args.component {
        let descriptor = registry
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Unknown component: {}", id))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(descriptor)?);
        } else {
            print_details(descriptor);
        }
        return Ok(());
    }

    if args.json {
        let all: Vec<_> = registry.all().collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("Available Components");
    println!("====================");
    println!();
    println!("  {:14}  {:7}  {:5}  {}", "ID", "Role", "Ports", "Description");
    println!("  {:14}  {:7}  {:5}  {}", "--", "----", "-----", "-----------");
    for d in registry.all() {
        println!(
            "  {:14}  {:7}  {:5}  {}",
            d.id,
            d.role.name(),
            format!("{}>{}", d.inputs, d.outputs),
            d.description
        );
    }
    println!();
    println!("Use 'cithrus components <ID>' for parameters.");
    Ok(())
}

fn print_details(d: &ComponentDescriptor) {
    println!("{} ({})", d.name, d.id);
    println!("{}", "=".repeat(d.name.len() + d.id.len() + 3));
    println!();
    println!("{}", d.description);
    println!();
    println!("Role: {}, {} input(s), {} output(s)", d.role.name(), d.inputs, d.outputs);
    println!();

    if d.params.is_empty() {
        println!("No parameters.");
        return;
    }
    println!("Parameters:");
    println!();
    println!("  {:10}  {:8}  {:8}  {}", "Name", "Required", "Default", "Description");
    println!("  {:10}  {:8}  {:8}  {}", "----", "--------", "-------", "-----------");
    for p in d.params {
        println!(
            "  {:10}  {:8}  {:8}  {}",
            p.name,
            if p.required { "yes" } else { "no" },
            p.default.unwrap_or("-"),
            p.description
        );
    }
}
