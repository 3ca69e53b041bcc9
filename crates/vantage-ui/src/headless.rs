//! Headless window backend.
//!
//! Prints a summary of the resolved session to stdout and returns without
//! entering an interactive loop. Selected with `VANTAGE_UI=headless`; useful
//! for scripted runs and anywhere no terminal UI is wanted.

use vantage_core::Engine;

/// Print the session summary.
pub fn run(engine: &dyn Engine, title: &str)
{
    println!("{title}");

    let analysis = engine.analysis();
    if let Some(image) = analysis.image() {
        println!(
            "  image: {} ({}, {}, base {}, {} bytes)",
            image.path.display(),
            image.format,
            image.cpu,
            image.base,
            image.size
        );
        if let Some(entry) = image.entry {
            println!("  entry: {entry}");
        }
    }

    let label_count = analysis.labels().count();
    if label_count > 0 {
        println!("  labels: {label_count}");
    }
    if !analysis.prototypes().is_empty() {
        println!("  prototypes: {}", analysis.prototypes().len());
    }
    for root in analysis.roots() {
        match (&root.addr, &root.label) {
            (Some(addr), _) => println!("  disassemble {}{}", addr, if root.fast { " (fast)" } else { "" }),
            (None, Some(label)) => println!("  disassemble {label} (pending)"),
            (None, None) => {}
        }
    }
    if let Some(cursor) = analysis.cursor() {
        println!("  cursor: {cursor}");
    }
}
