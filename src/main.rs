//! M6809 Simulator - CLI Entry Point
//!
//! Commands:
//! - `m6809-sim run <program>` - Assemble and run an ASM file
//! - `m6809-sim debug <program>` - Interactive debugger
//! - `m6809-sim asm <source>` - Assemble and print or save the listing
//! - `m6809-sim test` - Built-in self-test

use clap::{Parser, Subcommand};
use m6809::{ExecutionController, SimConfig};

#[derive(Parser)]
#[command(name = "m6809-sim")]
#[command(version = "0.1.0")]
#[command(about = "A Motorola 6809 emulator with a two-pass assembler and a stepping debugger")]
struct Cli {
    /// JSON configuration file (memory map, history size, run limit)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a program and run it until END or SWI
    Run {
        /// Path to the ASM file to execute
        program: String,
        /// Maximum number of instructions to run (default: from config)
        #[arg(short, long)]
        max_instructions: Option<u64>,
        /// Print each instruction as it executes
        #[arg(short, long)]
        trace: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the ASM file to debug
        program: String,
    },
    /// Assemble source and print the listing
    Asm {
        /// Path to the source file
        source: String,
        /// Save the listing as JSON
        #[arg(short, long)]
        output: Option<String>,
        /// Also print the symbol table
        #[arg(short, long)]
        symbols: bool,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run { program, max_instructions, trace }) => {
            let mut config = config;
            if let Some(limit) = max_instructions {
                config.run_limit = limit;
            }
            run_program(&program, config, trace);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program, config);
        }
        Some(Commands::Asm { source, output, symbols }) => {
            assemble_file(&source, output, symbols, &config);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("M6809 Simulator v0.1.0");
            println!("A Motorola 6809 emulator");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_program();
        }
    }
}

fn load_config(path: Option<&str>) -> SimConfig {
    let Some(path) = path else {
        return SimConfig::default();
    };
    match SimConfig::load(path) {
        Ok(config) => {
            println!("⚙️  Config: {}", path);
            config
        }
        Err(e) => {
            eprintln!("❌ Failed to load config: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_source(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load and assemble, exiting on error.
fn prepare(path: &str, config: SimConfig) -> ExecutionController {
    let source = read_source(path);
    let mut ctl = ExecutionController::new(config);
    match ctl.load_and_assemble(&source) {
        Ok(assembly) => {
            println!(
                "📝 Assembled {} bytes, {} labels",
                assembly.byte_count(),
                assembly.symbols.len()
            );
        }
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    }
    ctl
}

fn run_program(path: &str, config: SimConfig, trace: bool) {
    println!("🔧 Running: {}", path);
    let limit = config.run_limit;
    let mut ctl = prepare(path, config);

    println!();
    println!("━━━ Execution ━━━");

    let result = if trace {
        trace_run(&mut ctl, limit)
    } else {
        ctl.run()
    };

    let count = match result {
        Ok(count) => count,
        Err(e) => {
            eprintln!("❌ {}", e);
            print_state(&ctl);
            std::process::exit(1);
        }
    };

    println!();
    println!("━━━ Result ━━━");
    println!("Instructions: {}", count);
    print_state(&ctl);
}

/// Step-by-step run that prints every executed line.
fn trace_run(ctl: &mut ExecutionController, limit: u64) -> Result<u64, m6809::ExecError> {
    let mut count = 0;
    while count < limit {
        let line = ctl.current_line();
        let pc = ctl.registers().pc;
        if !ctl.step()? {
            return Ok(count);
        }
        let text = ctl.lines().get(line).map_or("", |l| l.text.as_str());
        let regs = ctl.registers();
        println!(
            "{:04X}: {:<24} A={:02X} B={:02X} X={:04X} Y={:04X} CC={}",
            pc, text, regs.a, regs.b, regs.x, regs.y, regs.flags_string()
        );
        count += 1;
    }
    if ctl.status()? != m6809::LineStatus::Ready {
        return Ok(count);
    }
    Err(m6809::ExecError::RunawayLimit { limit })
}

fn print_state(ctl: &ExecutionController) {
    let regs = ctl.registers();
    println!("PC: ${:04X}   DP: ${:02X}", regs.pc, regs.dp);
    println!("A:  ${:02X}     B:  ${:02X}     D: ${:04X}", regs.a, regs.b, regs.d());
    println!("X:  ${:04X}   Y:  ${:04X}", regs.x, regs.y);
    println!("S:  ${:04X}   U:  ${:04X}", regs.s, regs.u);
    println!("CC: {} (${:02X})", regs.flags_string(), regs.cc);
    if let Some(line) = ctl.current_source_line() {
        println!("Line {}: {}", line.number, line.text);
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str, config: SimConfig) {
    use m6809::tui::run_debugger;

    println!("🔍 Loading: {}", path);
    let ctl = prepare(path, config);

    println!("🚀 Launching debugger...");
    println!();

    if let Err(e) = run_debugger(ctl) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str, _config: SimConfig) {
    eprintln!("❌ Debugger not available: built without the `tui` feature");
    std::process::exit(1);
}

fn assemble_file(source_path: &str, output: Option<String>, symbols: bool, config: &SimConfig) {
    use m6809::asm::{assemble_with, save_listing};

    println!("📝 Assembling: {}", source_path);
    let source = read_source(source_path);

    let (assembly, _) = match assemble_with(&source, config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    print!("{}", assembly.listing.to_text());
    println!();
    println!("✓ Assembled {} bytes", assembly.byte_count());

    if symbols {
        println!();
        println!("━━━ Symbols ━━━");
        for (name, addr) in assembly.symbols.sorted() {
            println!("{:<16} ${:04X}", name, addr);
        }
    }

    if let Some(out_path) = output {
        if let Err(e) = save_listing(&out_path, &assembly.listing) {
            eprintln!("❌ Failed to save listing: {}", e);
            std::process::exit(1);
        }
        println!("✓ Saved to {}", out_path);
    }
}

const DEMO: &str = "
        ORG $FC00
        LDA #$05
        LDB #$00
LOOP:   ADDB #$03
        DECA
        BNE LOOP
        STB $00
        END
";

fn demo_program() {
    println!("━━━ Demo: 5 × 3 by repeated addition ━━━");
    println!();

    let mut ctl = ExecutionController::default();
    match ctl.load_and_assemble(DEMO) {
        Ok(assembly) => print!("{}", assembly.listing.to_text()),
        Err(e) => {
            eprintln!("❌ {}", e);
            return;
        }
    }
    println!();

    match ctl.run() {
        Ok(count) => {
            println!("Executed {} instructions", count);
            println!("B = ${:02X}, RAM[$00] = ${:02X}", ctl.registers().b, ctl.read_memory(0x00));
        }
        Err(e) => eprintln!("❌ {}", e),
    }
}

fn run_self_test() {
    use m6809::CcFlag;

    println!("━━━ M6809 Simulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut check = |name: &str, ok: bool| {
        print!("{}... ", name);
        if ok {
            println!("✓");
            passed += 1;
        } else {
            println!("✗");
            failed += 1;
        }
    };

    // Test 1: Emitted bytes
    let emitted = m6809::assemble("ORG $FC00\nLDA #$05\nSTA $00\nEND")
        .map(|(_, mem)| mem.dump(0xFC00, 5).into_iter().map(|(_, b)| b).collect::<Vec<u8>>());
    check("Assembler output", emitted.ok().as_deref() == Some(&[0x86, 0x05, 0x97, 0x00, 0x3F][..]));

    // Test 2: Run to END
    let mut ctl = ExecutionController::default();
    let ran = ctl.load_and_assemble("LDA #$05\nSTA $00\nEND").is_ok() && ctl.run().is_ok();
    check("Load/store execution", ran && ctl.registers().a == 5 && ctl.read_memory(0) == 5);

    // Test 3: NEGA overflow
    let mut ctl = ExecutionController::default();
    let ran = ctl.load_and_assemble("LDA #$80\nNEGA\nEND").is_ok() && ctl.run().is_ok();
    let regs = *ctl.registers();
    check(
        "NEGA of $80",
        ran && regs.a == 0x80 && regs.flag(CcFlag::V) && regs.flag(CcFlag::C) && regs.flag(CcFlag::N),
    );

    // Test 4: Branch loop
    let mut ctl = ExecutionController::default();
    let ran = ctl.load_and_assemble(DEMO).is_ok() && ctl.run().is_ok();
    check("Branch loop", ran && ctl.registers().b == 15);

    // Test 5: Stack round trip
    let mut ctl = ExecutionController::default();
    let ran = ctl
        .load_and_assemble("LDS #$0300\nLDA #1\nLDB #2\nLDX #$1234\nPSHS A,B,X\nCLRA\nCLRB\nLDX #0\nPULS A,B,X\nEND")
        .is_ok()
        && ctl.run().is_ok();
    let regs = *ctl.registers();
    check("PSHS/PULS round trip", ran && regs.a == 1 && regs.b == 2 && regs.x == 0x1234 && regs.s == 0x0300);

    // Test 6: Step back
    let mut ctl = ExecutionController::default();
    let ok = ctl.load_and_assemble("LDA #1\nLDA #2\nEND").is_ok()
        && matches!(ctl.step(), Ok(true))
        && matches!(ctl.step(), Ok(true))
        && ctl.step_back();
    check("Step back", ok && ctl.registers().a == 1);

    // Test 7: Branch range
    let far = m6809::assemble("BRA FAR\nRMB $100\nFAR: NOP\nEND");
    check("Short branch range check", matches!(far, Err(m6809::AsmError::BranchOutOfRange { line: 1, .. })));

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
