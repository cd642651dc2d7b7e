use clap::Parser;
use reeltrack::cli::{Cli, Command, ForgetArgs, InventoryArgs, ListArgs, ScanArgs};
use reeltrack::config::{self, Config, ConfigFile};
use reeltrack::error::{self, RunError};
use reeltrack::lock::RunLock;
use reeltrack::logging;
use reeltrack::run::{self, RunSummary};
use reeltrack::store::{DeleteOutcome, Store};

fn print_summary(summary: &RunSummary) {
    let new_names = &summary.reconciliation.new_names;
    let lost_names = &summary.reconciliation.lost_names;

    for name in lost_names {
        println!("LOST: {name}");
    }

    println!();
    println!(
        "{} files seen, {} new, {} lost",
        summary.files_seen,
        new_names.len(),
        lost_names.len()
    );

    if summary.failed_roots > 0 {
        println!("{} library root(s) could not be scanned", summary.failed_roots);
    }

    if let Some(path) = &summary.additions_report {
        println!("New titles written to {}", path.display());
    }
    println!("Removed titles written to {}", summary.removals_report.display());
}

fn scan_command(args: &ScanArgs) -> i32 {
    let config = match Config::from_scan_args(args) {
        Ok(config) => config,
        Err(e) => {
            let e = RunError::from(e);
            eprintln!("{e}");
            return e.exit_code();
        }
    };

    println!("Found the following paths for your content:");
    for root in &config.roots {
        println!("{}", root.display());
    }

    let lookup = run::poster_lookup(&config);
    match run::run(&config, lookup) {
        Ok(summary) => {
            print_summary(&summary);
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn open_inventory(args: &InventoryArgs) -> Result<(RunLock, Store), RunError> {
    let file = ConfigFile::load(args.config.as_deref())?;
    let db_path = config::database_path(args, &file);
    let lock = RunLock::acquire(&db_path)?;
    let store = Store::open(&db_path)?;
    Ok((lock, store))
}

fn list_command(args: &ListArgs) -> i32 {
    let (_lock, store) = match open_inventory(&args.inventory) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    let records = match store.list_records() {
        Ok(records) => records,
        Err(e) => {
            let e = RunError::from(e);
            eprintln!("Error loading inventory: {e}");
            return e.exit_code();
        }
    };

    if records.is_empty() {
        println!("No titles recorded yet. Run 'reeltrack scan' to create the inventory.");
        return 0;
    }

    println!("{:<28} {:<30} Path", "First seen", "Name");
    println!("{}", "-".repeat(80));
    for record in &records {
        println!("{:<28} {:<30} {}", record.first_seen, record.name, record.path.display());
    }
    println!("\n{} titles recorded", records.len());

    0
}

fn forget_command(args: &ForgetArgs) -> i32 {
    let (_lock, mut store) = match open_inventory(&args.inventory) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    match store.delete_by_name(&args.name) {
        Ok(DeleteOutcome::Deleted(count)) => {
            println!("Forgot {count} record(s) named {}", args.name);
            0
        }
        Ok(DeleteOutcome::NotFound) => {
            eprintln!("No records named {}", args.name);
            error::EXIT_NOT_FOUND
        }
        Err(e) => {
            let e = RunError::from(e);
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn main() {
    let command = Cli::parse().into_command();
    logging::init(command.inventory().verbose);

    tracing::debug!("starting reeltrack {}", env!("CARGO_PKG_VERSION"));

    let code = match &command {
        Command::Scan(args) => scan_command(args),
        Command::List(args) => list_command(args),
        Command::Forget(args) => forget_command(args),
    };

    std::process::exit(code);
}
