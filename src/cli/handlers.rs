// FILE: src/cli/handlers.rs
use crate::{
    cli::OutputFormat,
    assignment::{find_containers, Scope},
    deep_cache::DeepCache,
    document::Document,
    row::{load_rows, RowExt},
    schema::{all_schemas, schema_for},
    ImportSession, ImportStats, Progress, ReplayError, Result,
};

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

/// Prints one line per finished container
struct ConsoleProgress {
    total: usize,
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }

    fn log(&mut self, msg: &str) {
        println!("   {}", msg);
    }

    fn container_done(&mut self, index: usize, name: &str) {
        log::info!("[{}/{}] {}", index + 1, self.total, name);
    }
}

// --- APPLY ---
pub fn handle_apply_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let document_path = required(matches, "document")?;
    let rows_path = required(matches, "rows")?;
    let output_path = match matches.get_one::<String>("output") {
        Some(path) => path.clone(),
        None => default_output_path(document_path, cli.output_directory()),
    };

    let options = cli.build_replay_options(matches)?;

    println!("🔨 Replaying {} into {} -> {}", rows_path, document_path, output_path);
    let start = Instant::now();

    let mut doc = Document::load(document_path)?;
    let rows = load_rows(rows_path)?;
    let mut progress = ConsoleProgress { total: 0 };
    let stats = ImportSession::new(options).run(&mut doc, &rows, &mut progress)?;
    doc.save(&output_path)?;

    println!("✅ Replay successful!");
    println!("   Containers: {}", stats.container_count);
    println!("   Properties applied: {}", stats.properties_applied);
    println!("   Time: {}ms", start.elapsed().as_millis());
    report_failures(&stats);

    if matches.get_flag("stats") {
        stats.print_summary();
    }

    Ok(())
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| ReplayError::config(format!("missing argument <{}>", name)))
}

fn default_output_path(document_path: &str, output_directory: Option<&str>) -> String {
    let path = Path::new(document_path);
    let file_name = format!(
        "{}.filled.json",
        path.file_stem().and_then(|s| s.to_str()).unwrap_or("document")
    );
    match output_directory {
        Some(dir) => Path::new(dir).join(file_name).to_string_lossy().into_owned(),
        None => path.with_file_name(file_name).to_string_lossy().into_owned(),
    }
}

fn report_failures(stats: &ImportStats) {
    if stats.properties_failed > 0 {
        println!("⚠️  {} properties could not be applied", stats.properties_failed);
    }
    if stats.images.failed > 0 {
        println!("⚠️  {} images failed", stats.images.failed);
    }
}

// --- SCHEMAS ---
pub fn handle_schemas_command(matches: &clap::ArgMatches) -> Result<()> {
    let format = matches.get_one::<OutputFormat>("format").unwrap_or(&OutputFormat::Text);

    match format {
        OutputFormat::Json => {
            let descriptions: Vec<_> = all_schemas().iter().map(|s| s.describe()).collect();
            println!("{}", serde_json::to_string_pretty(&descriptions)?);
        }
        OutputFormat::Text => {
            for schema in all_schemas() {
                println!("📐 {} ({} mappings)", schema.container_names.join(", "), schema.mapping_count());
                for mapping in schema.container_properties {
                    println!("   {:<28} <- {}", mapping.property_names.join("|"), mapping.strategy());
                }
                for nested in schema.nested_instances {
                    println!("   {}:", nested.instance_name);
                    for mapping in nested.properties {
                        println!("     {:<26} <- {}", mapping.property_names.join("|"), mapping.strategy());
                    }
                }
                if !schema.replaces_handlers.is_empty() {
                    println!("   replaces: {}", schema.replaces_handlers.join(", "));
                }
                println!();
            }
        }
    }
    Ok(())
}

// --- CHECK ---
pub fn handle_check_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let recursive = matches.get_flag("recursive");

    if recursive && Path::new(input_path).is_dir() {
        check_directory_recursive(input_path)
    } else {
        check_single_file(input_path)
    }
}

/// Row count per `#SnippetType`, blank types grouped under `(none)`
fn snippet_type_counts(rows: &[crate::row::Row]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        let snippet_type = match row.trimmed("#SnippetType") {
            "" => "(none)".to_string(),
            other => other.to_string(),
        };
        *counts.entry(snippet_type).or_insert(0) += 1;
    }
    counts
}

fn check_single_file(input_path: &str) -> Result<()> {
    println!("🔍 Checking {}", input_path);
    match load_rows(input_path) {
        Ok(rows) => {
            let catalog = rows.iter().filter(|r| r.is_true("#isCatalogPage")).count();
            println!("✅ {} - {} rows ({} catalog)", input_path, rows.len(), catalog);
            for (snippet_type, count) in snippet_type_counts(&rows) {
                println!("   {:<28} {}", snippet_type, count);
            }
            Ok(())
        }
        Err(e) => {
            println!("❌ {} - {}", input_path, e);
            Err(e)
        }
    }
}

fn check_directory_recursive(dir_path: &str) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    for entry in walkdir::WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| {
            ReplayError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if !entry.file_type().is_file() || entry.path().extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        total_files += 1;
        if check_single_file(&entry.path().to_string_lossy()).is_err() {
            error_files += 1;
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", total_files);
    println!("   Files with errors: {}", error_files);
    if total_files > 0 {
        println!(
            "   Success rate: {:.1}%",
            (total_files - error_files) as f64 / total_files as f64 * 100.0
        );
    }

    if error_files > 0 {
        Err(ReplayError::invalid_format(format!("{} files have errors", error_files)))
    } else {
        Ok(())
    }
}

// --- INSPECT ---
pub fn handle_inspect_command(matches: &clap::ArgMatches) -> Result<()> {
    let document_path = required(matches, "document")?;
    println!("🔬 Inspecting {}", document_path);

    let doc = Document::load(document_path)?;
    let mut kinds: Vec<_> = doc.kind_histogram().into_iter().collect();
    kinds.sort_by(|a, b| b.1.cmp(&a.1));

    println!("   Page: {}", doc.current_page);
    println!("   Nodes: {}", doc.len());
    for (kind, count) in kinds {
        println!("     {:<12} {}", format!("{:?}", kind), count);
    }
    println!("   Components: {}", doc.components.len());
    println!("   Images: {}", doc.images().len());

    let containers = find_containers(&doc, Scope::Page);
    println!("\n   Containers: {}", containers.len());
    for container in containers {
        let name = &doc.node(container).name;
        let cache = DeepCache::build(&doc, container);
        cache.stats.print_summary(name);
        match schema_for(name) {
            Some(schema) => println!("     schema: {} ({} mappings)", schema.name(), schema.mapping_count()),
            None => println!("     schema: none (hooks only)"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::row_from;

    #[test]
    fn test_default_output_path() {
        assert_eq!(default_output_path("in/serp.json", None), "in/serp.filled.json");
        assert_eq!(default_output_path("in/serp.json", Some("out")), "out/serp.filled.json");
    }

    #[test]
    fn test_snippet_type_counts() {
        let rows = vec![
            row_from([("#SnippetType", "EShopItem")]),
            row_from([("#SnippetType", "EShopItem")]),
            row_from([("#SnippetType", " ")]),
            row_from([("#OrganicTitle", "x")]),
            row_from([("#SnippetType", "ESnippet")]),
        ];
        let counts = snippet_type_counts(&rows);
        assert_eq!(counts.get("EShopItem"), Some(&2));
        assert_eq!(counts.get("ESnippet"), Some(&1));
        assert_eq!(counts.get("(none)"), Some(&2));
    }

    #[test]
    fn test_check_directory_counts_failures() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("ok.json"), r##"[{"#SnippetType": "ESnippet"}]"##).unwrap();
        std::fs::write(nested.join("bad.json"), "not json").unwrap();
        std::fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let result = check_directory_recursive(dir.path().to_str().unwrap());
        assert!(matches!(result, Err(ReplayError::InvalidFormat { .. })));

        std::fs::remove_file(nested.join("bad.json")).unwrap();
        assert!(check_directory_recursive(dir.path().to_str().unwrap()).is_ok());
    }
}
