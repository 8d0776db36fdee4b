use framerv::config::Config;
use framerv::decoder::decode;
use framerv::framebuffer::FrameBuffer;
use framerv::gpu::{Headless, RenderLoop};
use framerv::loader;
use framerv::simulator::{bus::Bus, memory::Memory, Halt, Simulator};
use framerv::stop::Stop;
use owo_colors::OwoColorize;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

fn print_instructions(words: &[u32]) {
    eprintln!("{}", "Instructions: ---------------".bright_blue());
    for (i, &word) in words.iter().enumerate() {
        eprintln!("{:08x}: {:08x}  {}", i * 4, word, decode(word));
    }
    eprintln!("{}", "-----------------------------".bright_blue());
}

fn report(sim: &Simulator, halt: &Halt, print_state: bool, started: std::time::Instant) {
    if let Halt::Fault { .. } = halt {
        eprintln!("{} {}", "error:".bright_red(), halt);
    }
    eprintln!("Finished in {}ms", started.elapsed().as_millis());
    if print_state {
        sim.print_state();
    }
}

fn run(config: Config) -> Result<ExitCode, Box<dyn Error>> {
    let frame_buffer = Arc::new(FrameBuffer::new(config.width, config.height));
    let mut bus = Bus::new(Memory::new(config.memory_size), frame_buffer.clone());

    let words = loader::load_file(&mut bus, &config.file, config.format)?;
    if config.print_instructions {
        print_instructions(&words);
    }

    let stop = Stop::new();
    let mut sim = Simulator::new(bus);

    if config.no_video {
        let render = RenderLoop::new(frame_buffer, Headless::new(config.fps), stop.clone()).spawn()?;

        let simulator = {
            let stop = stop.clone();
            thread::Builder::new()
                .name("framerv simulator".into())
                .spawn(move || {
                    let started = std::time::Instant::now();
                    let halt = sim.run(&stop);
                    report(&sim, &halt, config.print_state, started);
                    stop.request();
                    halt
                })?
        };

        let frames = render.join().map_err(|_| "render thread panicked")?;
        stop.request();
        let halt = simulator.join().map_err(|_| "simulator thread panicked")?;
        tracing::info!(frames, %halt, "done");

        return Ok(if halt.is_fault() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    let window_stop = stop.clone();
    thread::Builder::new()
        .name("framerv simulator".into())
        .spawn(move || {
            let started = std::time::Instant::now();
            let halt = sim.run(&stop);
            report(&sim, &halt, config.print_state, started);
            if halt.is_fault() {
                std::process::exit(1);
            }

            // the last frame stays on screen until the window is closed or Escape is pressed
            while !stop.is_requested() {
                thread::sleep(std::time::Duration::from_millis(50));
            }
            std::process::exit(0);
        })?;

    framerv::renderer::init(frame_buffer, config.scale, window_stop);
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::get() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red(), e);
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red(), e);
            ExitCode::FAILURE
        }
    }
}
