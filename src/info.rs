use std::path::PathBuf;

use serde::Serialize;

use vaultbridge::config::{CONFIG_FILE, Config};

/// Output the comprehensive vaultbridge reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_found: bool,
    config_valid: bool,
    exclude: Vec<String>,
    include: Vec<String>,
    page_entity_types: Vec<String>,
}

fn gather_state(root: &std::path::Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let loaded = Config::load(root);
    let config_valid = loaded.is_ok();
    let config = loaded.unwrap_or_default();

    CurrentState {
        config_found,
        config_valid,
        exclude: config.exclude().to_vec(),
        include: config.include().to_vec(),
        page_entity_types: config.page_entity_types().to_vec(),
    }
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# vaultbridge {version}

Reference resolution for moving notes between a markdown vault and a
document store. Links and assets are protected with placeholder tokens while
content is converted, then rewritten for the destination.

## Vault Syntax (import source, export target)

    [[Target]]                    link by note name
    [[Folder/Target#Heading|Label]]  partial path, heading, label
    ![[image.png|300]]            embedded asset (size alias ignored)
    ![alt](path/to/image.png)     markdown image
    [text](path/to/file.pdf)      linked asset
    @UUID[JournalEntry.id]{{Label}} store link kept as-is

## Store Syntax (import target, export source)

    @UUID[JournalEntry.id]{{Label}}          content link
    <a data-uuid=\"JournalEntry.id\">Label</a> structured link
    <img src=\"data/path.png\" alt=\"Alt\">    embedded asset
    <a href=\"data/path.pdf\">Label</a>       linked asset

## Resolution

    import   name -> identifier: same folder, then nearest ancestor folder,
             then anywhere; shortest path, then batch order
    export   identifier -> name: bare name in the same folder, else full path;
             unknown page identifiers stay in store syntax

## Workflow

    vaultbridge scan                              List references in every vault note
    vaultbridge extract --format markup <file>    List references in one file
    vaultbridge import <batch.json> [--out file]  Resolve a vault batch for the store
    vaultbridge export <batch.json> [--out file]  Resolve a store batch for the vault

Set `VAULTBRIDGE_LOG=debug` to trace tie-breaks and index exclusions.

## Configuration ({CONFIG_FILE})

    include = [\"Campaign/\"]                 # only scan these paths
    exclude = [\"Campaign/Drafts/\"]          # skip these paths
    page_entity_types = [\"JournalEntry\", \"JournalEntryPage\"]

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    match (state.config_found, state.config_valid) {
        (false, _) => println!("Config:      {CONFIG_FILE} (not found)"),
        (true, true) => println!("Config:      {CONFIG_FILE} (found)"),
        (true, false) => println!("Config:      {CONFIG_FILE} (invalid, defaults shown)"),
    }
    println!("Include:     {}", list_or_all(&state.include));
    println!("Exclude:     {}", list_or_none(&state.exclude));
    println!("Page types:  {}", state.page_entity_types.join(", "));
}

fn list_or_all(items: &[String]) -> String {
    if items.is_empty() {
        return "(everything)".to_string();
    }
    return items.join(", ");
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    return items.join(", ");
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success / every reference resolved |
| 1    | Finished with unresolved references |
| 3    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    current_state: StateJson,
    exit_codes: Vec<ExitCodeInfo>,
    syntax: Vec<SyntaxInfo>,
    version: String,
}

#[derive(Serialize)]
struct SyntaxInfo {
    example: String,
    format: String,
    meaning: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_found: bool,
    config_valid: bool,
    exclude: Vec<String>,
    include: Vec<String>,
    page_entity_types: Vec<String>,
}

fn syntax_entry(format: &str, example: &str, meaning: &str) -> SyntaxInfo {
    return SyntaxInfo { example: example.to_string(), format: format.to_string(), meaning: meaning.to_string() };
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            config_found: state.config_found,
            config_valid: state.config_valid,
            exclude: state.exclude.clone(),
            include: state.include.clone(),
            page_entity_types: state.page_entity_types.clone(),
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success / every reference resolved".to_string() },
            ExitCodeInfo { code: 1, meaning: "Finished with unresolved references".to_string() },
            ExitCodeInfo { code: 3, meaning: "Runtime error".to_string() },
        ],
        syntax: vec![
            syntax_entry("markup", "[[Target#Heading|Label]]", "document link"),
            syntax_entry("markup", "![[image.png]]", "embedded asset"),
            syntax_entry("markup", "![alt](path.png)", "embedded asset"),
            syntax_entry("markup", "[text](file.pdf)", "linked asset"),
            syntax_entry("storage", "@UUID[JournalEntry.id]{Label}", "document link"),
            syntax_entry("storage", "<a data-uuid=\"JournalEntry.id\">Label</a>", "document link"),
            syntax_entry("storage", "<img src=\"path.png\" alt=\"Alt\">", "embedded asset"),
            syntax_entry("storage", "<a href=\"file.pdf\">Label</a>", "linked asset"),
        ],
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
