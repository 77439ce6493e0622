//! Lyra compiler CLI.

use lyrac::commands::{explain_name, parse_cli_options, parse_file, tokens_file, ParseCliOptions};

fn main() {
    lyrac::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: lyra parse <file.lyra> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --error-limit=<n>   Stop reporting after n errors (0 = unlimited)");
                eprintln!("  --color=<mode>      Color output: auto, always, never");
                std::process::exit(1);
            }
            let options = parse_cli_options(&args[3..]);
            parse_file(&args[2], &options);
        }
        "tokens" => {
            if args.len() < 3 {
                eprintln!("Usage: lyra tokens <file.lyra> [--comments]");
                std::process::exit(1);
            }
            let keep_comments = args.iter().skip(3).any(|arg| arg == "--comments");
            tokens_file(&args[2], keep_comments);
        }
        "name" => {
            if args.len() < 3 {
                eprintln!("Usage: lyra name <declname>");
                eprintln!("Example: lyra name 'Map.insert(key:value:)'");
                std::process::exit(1);
            }
            explain_name(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Lyra compiler {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // A bare file path parses it, matching `lyra parse <path>`.
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("lyra"))
            {
                parse_file(command, &ParseCliOptions::default());
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Lyra compiler front end");
    println!();
    println!("Usage: lyra <command> [options]");
    println!();
    println!("Commands:");
    println!("  parse <file.lyra>    Parse a file and report diagnostics");
    println!("  tokens <file.lyra>   Print the corrected token stream");
    println!("  name <declname>      Decode a declaration name like 'foo(bar:)'");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Parse options:");
    println!("  --error-limit=<n>   Stop reporting after n errors (0 = unlimited)");
    println!("  --color=<mode>      Color output: auto, always, never");
    println!();
    println!("Tokens options:");
    println!("  --comments          Include comment tokens in the stream");
    println!();
    println!("Examples:");
    println!("  lyra parse main.lyra");
    println!("  lyra parse main.lyra --error-limit=0");
    println!("  lyra tokens main.lyra --comments");
    println!("  lyra name 'Map.insert(key:value:)'");
    println!("  lyra name 'getter:count()'");
}
