mod highlighter;
mod lexer;

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use qbisa::{
    DeploymentRequest, Error, ErrorResponse, ExecutionOptions, Opcode, Program,
    RegisterAddressing, Vm, assemble, compile, deploy, render_error,
};
use rand::{SeedableRng, rngs::StdRng};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::debug;

/// QBISA - a quantum-biological bytecode virtual machine
#[derive(Parser, Debug)]
#[command(name = "qbisa")]
#[command(about = "Compile, assemble and run QBISA programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile keyword source and print the bytecode listing
    Compile {
        /// Print the bytecode as hex instead of a listing
        #[arg(long)]
        hex: bool,

        /// Source file (reads stdin if omitted)
        input: Option<PathBuf>,
    },

    /// Run a program and print the final organism state as JSON
    Run {
        /// Treat the input as assembly instead of keyword source
        #[arg(long)]
        asm: bool,

        #[command(flatten)]
        options: RunArgs,

        /// Source file (reads stdin if omitted)
        input: Option<PathBuf>,
    },

    /// Assemble a program and print its bytecode as hex
    Asm {
        /// Source file (reads stdin if omitted)
        input: Option<PathBuf>,
    },

    /// Disassemble hex bytecode into an offset listing
    Disasm {
        /// Hex bytes, e.g. "10 02 40"; reads stdin if omitted
        bytes: Option<String>,
    },

    /// Handle a JSON deployment request and print the JSON response
    Deploy {
        /// Seed for the VM and the sampled metrics
        #[arg(long)]
        seed: Option<u64>,

        /// Request file (reads stdin if omitted)
        input: Option<PathBuf>,
    },

    /// Interactive assembly session over one persistent machine
    Repl {
        #[command(flatten)]
        options: RunArgs,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Seed for QMEAS and MUTATE
    #[arg(long)]
    seed: Option<u64>,

    /// Abort after this many instructions
    #[arg(long)]
    max_steps: Option<usize>,

    /// Let QSUP and QENT act on the registers their operands name
    #[arg(long)]
    addressed_registers: bool,
}

impl RunArgs {
    fn execution_options(&self) -> ExecutionOptions {
        ExecutionOptions {
            seed: self.seed,
            max_steps: self.max_steps,
            register_addressing: if self.addressed_registers {
                RegisterAddressing::Addressed
            } else {
                RegisterAddressing::First
            },
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).into_diagnostic(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .into_diagnostic()?;
            Ok(buf)
        }
    }
}

fn parse_hex(text: &str) -> Result<Program> {
    let digits: String = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|chunk| chunk.trim_start_matches("0x").trim_start_matches("0X"))
        .collect();
    if !digits.is_ascii() {
        return Err(miette!("hex input must be ASCII"));
    }
    if digits.len() % 2 != 0 {
        return Err(miette!("odd number of hex digits"));
    }
    let bytes = digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let text = String::from_utf8_lossy(pair);
            u8::from_str_radix(&text, 16).map_err(|_| miette!("invalid hex byte '{}'", text))
        })
        .collect::<Result<Vec<u8>>>()?;
    Ok(Program::new(bytes))
}

fn to_hex(program: &Program) -> String {
    program
        .as_bytes()
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).into_diagnostic()?
    );
    Ok(())
}

/// Run a whole source text, reporting failures the way the REPL does.
fn run_source(source: &str, asm: bool, options: ExecutionOptions) -> Result<()> {
    let program = if asm {
        match assemble(source) {
            Ok(program) => program,
            Err(e) => {
                render_error(&Error::assemble(e, source));
                return Err(miette!("assembly failed"));
            }
        }
    } else {
        compile(source)
    };
    debug!(len = program.len(), "running program");

    match Vm::with_options(program, options).execute() {
        Ok(state) => print_json(&state),
        Err(e) => {
            render_error(&e.into());
            Err(miette!("execution failed"))
        }
    }
}

fn run_deploy(source: &str, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let request: DeploymentRequest = match serde_json::from_str(source) {
        Ok(request) => request,
        Err(e) => return print_json(&ErrorResponse::new(e.to_string())),
    };
    match deploy(&request, &mut rng) {
        Ok(response) => print_json(&response),
        Err(e) => print_json(&ErrorResponse::from(&e)),
    }
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline() -> (Reedline, DefaultPrompt) {
    let mut words: Vec<String> = Opcode::ALL
        .iter()
        .map(|opcode| opcode.mnemonic().to_string())
        .collect();
    words.extend([":state", ":reset", ".byte"].map(String::from));

    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['_', ':', '.']);
        completions.insert(words);
        completions
    });

    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_min_description_width(0)
        .with_max_description_width(50)
        .with_description_offset(1)
        .with_correct_cursor_pos(false);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let line_editor = Reedline::create()
        .with_highlighter(Box::new(highlighter::Highlighter))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(Box::new(ide_menu)))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("qbisa".to_string()),
        DefaultPromptSegment::Empty,
    );

    (line_editor, prompt)
}

/// Assemble one REPL entry and run it against the persistent machine.
fn interpret_input(vm: &mut Vm, options: &ExecutionOptions, input: &str) -> Result<()> {
    match input.trim() {
        "" => return Ok(()),
        ":state" => return print_json(vm.machine().organism()),
        ":reset" => {
            *vm = Vm::with_options(Program::default(), options.clone());
            println!("machine reset");
            return Ok(());
        }
        _ => {}
    }

    let program = match assemble(input) {
        Ok(program) => program,
        Err(e) => {
            render_error(&Error::assemble(e, input));
            return Ok(());
        }
    };
    vm.load(program);
    match vm.execute() {
        Ok(state) => {
            println!(
                "stack: {:?}  generation: {}  fitness: {}  phi: {}",
                vm.machine().stack().as_slice(),
                state.generation,
                state.fitness,
                state.consciousness.phi
            );
        }
        Err(e) => render_error(&e.into()),
    }
    Ok(())
}

fn repl(options: ExecutionOptions) -> Result<()> {
    let mut vm = Vm::with_options(Program::default(), options.clone());

    if atty::is(atty::Stream::Stdin) {
        let (mut line_editor, prompt) = setup_reedline();

        println!("QBISA REPL - one instruction per line, :state or :reset (Ctrl+D to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => interpret_input(&mut vm, &options, &buffer)?,
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        let reader = BufReader::new(std::io::stdin().lock());
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error reading line from stdin: {}", e);
                    return Ok(());
                }
            };
            interpret_input(&mut vm, &options, &line)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level; default to WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Some(Command::Compile { hex, input }) => {
            let program = compile(&read_input(input.as_ref())?);
            if hex {
                println!("{}", to_hex(&program));
            } else {
                print!("{}", program);
            }
            Ok(())
        }
        Some(Command::Run {
            asm,
            options,
            input,
        }) => run_source(
            &read_input(input.as_ref())?,
            asm,
            options.execution_options(),
        ),
        Some(Command::Asm { input }) => {
            let source = read_input(input.as_ref())?;
            match assemble(&source) {
                Ok(program) => {
                    println!("{}", to_hex(&program));
                    Ok(())
                }
                Err(e) => {
                    render_error(&Error::assemble(e, &source));
                    Err(miette!("assembly failed"))
                }
            }
        }
        Some(Command::Disasm { bytes }) => {
            let text = match bytes {
                Some(bytes) => bytes,
                None => read_input(None)?,
            };
            print!("{:?}", parse_hex(&text)?);
            Ok(())
        }
        Some(Command::Deploy { seed, input }) => run_deploy(&read_input(input.as_ref())?, seed),
        Some(Command::Repl { options }) => repl(options.execution_options()),
        None => repl(RunArgs::default().execution_options()),
    }
}
