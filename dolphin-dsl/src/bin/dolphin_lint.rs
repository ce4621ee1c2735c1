/// Dolphin Lint - Shows what the editor sees in a Dolphin prompt file
///
/// Usage: cargo run --bin dolphin_lint <dolphin-file> [--tokens] [--json] [--all-rules]

use dolphin_dsl::extract::extract_imports;
use dolphin_dsl::{
    dedupe_by_value, DslGrammarConfig, ExtractScope, Tokenizer, ValidationRules, Validator,
    VariableExtractor,
};
use std::fs;

struct Options {
    path: String,
    tokens: bool,
    json: bool,
    all_rules: bool,
}

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin dolphin_lint <dolphin-file> [--tokens] [--json] [--all-rules]");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  cargo run --bin dolphin_lint prompts/agent.dph --tokens");
    std::process::exit(2);
}

fn parse_args() -> Options {
    let mut path = None;
    let mut options = Options {
        path: String::new(),
        tokens: false,
        json: false,
        all_rules: false,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--tokens" => options.tokens = true,
            "--json" => options.json = true,
            "--all-rules" => options.all_rules = true,
            flag if flag.starts_with("--") => {
                eprintln!("❌ Unknown flag: {}", flag);
                usage();
            }
            _ if path.is_none() => path = Some(arg),
            _ => usage(),
        }
    }
    match path {
        Some(path) => Options { path, ..options },
        None => usage(),
    }
}

fn main() {
    let options = parse_args();

    let content = match fs::read_to_string(&options.path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", options.path, e);
            std::process::exit(2);
        }
    };

    let grammar = DslGrammarConfig::shared();
    let rules = if options.all_rules {
        ValidationRules::all()
    } else {
        ValidationRules::default()
    };
    let extractor = VariableExtractor::new(grammar.clone());
    let validator = Validator::new(grammar.clone(), rules);

    let variables = dedupe_by_value(extractor.extract(&content, ExtractScope::All));
    let imports = extract_imports(&content);
    let diagnostics = validator.validate(&content);
    let has_errors = diagnostics.iter().any(|d| d.is_error());

    if options.json {
        let report = serde_json::json!({
            "file": options.path,
            "variables": variables,
            "imports": imports,
            "diagnostics": diagnostics,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to serialize report: {}", e);
                std::process::exit(2);
            }
        }
        std::process::exit(if has_errors { 1 } else { 0 });
    }

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ DOLPHIN LINT");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    if options.tokens {
        println!("🔤 TOKENS:");
        println!("─────────────────────────────────────────────────────────────");
        let tokenizer = Tokenizer::new(grammar);
        for (idx, line) in tokenizer.tokenize(&content).iter().enumerate() {
            let rendered: Vec<String> = line
                .iter()
                .map(|token| format!("{}({:?})", token.category, token.text))
                .collect();
            println!("{:>4} │ {}", idx + 1, rendered.join(" "));
        }
        println!();
    }

    println!("📦 BOUND VARIABLES:");
    println!("─────────────────────────────────────────────────────────────");
    if variables.is_empty() {
        println!("  (none)");
    }
    for variable in &variables {
        println!("  {}", variable.value);
    }
    println!();

    println!("🧰 IMPORTS:");
    println!("─────────────────────────────────────────────────────────────");
    if imports.is_empty() {
        println!("  (none)");
    }
    for import in &imports {
        println!("  {}", import);
    }
    println!();

    println!("🔍 DIAGNOSTICS:");
    println!("─────────────────────────────────────────────────────────────");
    for diagnostic in &diagnostics {
        println!(
            "  {}:{}:{} {:?}: {}",
            options.path,
            diagnostic.range.start_line,
            diagnostic.range.start_column,
            diagnostic.severity,
            diagnostic.message
        );
    }
    println!();

    if has_errors {
        println!("❌ {} problem(s) found", diagnostics.len());
        std::process::exit(1);
    }
    println!("✅ No errors");
}
