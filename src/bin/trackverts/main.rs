//! Trackverts CLI - track block vertex editing tool.
//!
//! Usage: trackverts <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `trackverts --help` for available commands. Set `RUST_LOG=debug` for
//! per-operation detail.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};

use trackverts::algo::align::{self, Axis};
use trackverts::algo::chain::{self, ChainOptions, DEFAULT_CENTROID_EPSILON};
use trackverts::algo::rotate::{self, Turn};
use trackverts::algo::snap::{self, Selection, SnapOptions};
use trackverts::algo::weld::{self, WeldOptions};
use trackverts::algo::{grid, swap, Progress};
use trackverts::io;
use trackverts::mesh::{MeshObject, PointSource};
use trackverts::session::BlockKind;
use trackverts::validate;

#[derive(Parser)]
#[command(name = "trackverts")]
#[command(author, version, about = "Track block vertex editing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display object information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Print the nearest-neighbor chain of an object's vertices
    Chain {
        /// Input mesh file
        input: PathBuf,

        /// Distance under which a vertex counts as sitting on the centroid
        #[arg(short, long, default_value_t = DEFAULT_CENTROID_EPSILON)]
        epsilon: f64,

        /// Fail if the walk does not reach every vertex
        #[arg(long)]
        strict: bool,
    },

    /// Shift vertex positions along the chain
    Rotate {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Number of steps (negative shifts go backward)
        #[arg(short, long, allow_hyphen_values = true)]
        shift: isize,

        /// Fail if the walk does not reach every vertex
        #[arg(long)]
        strict: bool,
    },

    /// Rotate a block's rim by a quarter turn, keeping the centre vertex
    QuarterTurn {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Turn counter-clockwise ("R-90")
        #[arg(long)]
        ccw: bool,
    },

    /// Rotate a 3×3 rectangular block by a quarter turn
    GridRotate {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Turn counter-clockwise
        #[arg(long)]
        ccw: bool,
    },

    /// Swap the outer two of three selected vertices
    Swap {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Exactly three vertex indices, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        indices: Vec<usize>,
    },

    /// Weld nearby vertices across several objects
    Weld {
        /// Input mesh files (at least two)
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Directory the welded objects are written to (same file names)
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Maximum linking distance
        #[arg(short, long, default_value = "0.0001")]
        threshold: f64,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Snap vertices of one object onto the closest vertex of others
    Snap {
        /// Object whose vertices move
        active: PathBuf,

        /// Reference objects (left unchanged)
        #[arg(required = true)]
        references: Vec<PathBuf>,

        /// Output mesh file for the active object
        #[arg(short, long)]
        output: PathBuf,

        /// Only snap these vertex indices, comma separated (default: all)
        #[arg(short, long, value_delimiter = ',')]
        indices: Option<Vec<usize>>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Flatten vertices onto the plane through their mean along one axis
    Align {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Axis to flatten along (x, y or z)
        #[arg(short, long)]
        axis: Axis,

        /// Only align these vertex indices, comma separated (default: all)
        #[arg(short, long, value_delimiter = ',')]
        indices: Option<Vec<usize>>,
    },

    /// Classify objects as triblocks, quadblocks or invalid geometry
    Validate {
        /// Input mesh files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Rename the files with their classification suffix
        #[arg(long)]
        rename: bool,
    },

    /// Strip classification suffixes from file names
    ResetNames {
        /// Input mesh files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Chain { input, epsilon, strict } => {
            cmd_chain(&input, epsilon, strict)?;
        }

        Commands::Rotate {
            input,
            output,
            shift,
            strict,
        } => {
            cmd_rotate(&input, &output, shift, strict)?;
        }

        Commands::QuarterTurn { input, output, ccw } => {
            cmd_quarter_turn(&input, &output, turn_from_flag(ccw))?;
        }

        Commands::GridRotate { input, output, ccw } => {
            cmd_grid_rotate(&input, &output, turn_from_flag(ccw))?;
        }

        Commands::Swap {
            input,
            output,
            indices,
        } => {
            cmd_swap(&input, &output, &indices)?;
        }

        Commands::Weld {
            inputs,
            output_dir,
            threshold,
            sequential,
        } => {
            cmd_weld(&inputs, &output_dir, threshold, sequential)?;
        }

        Commands::Snap {
            active,
            references,
            output,
            indices,
            sequential,
        } => {
            let selection = indices.map_or(Selection::All, Selection::Indices);
            cmd_snap(&active, &references, &output, &selection, sequential)?;
        }

        Commands::Align {
            input,
            output,
            axis,
            indices,
        } => {
            let selection = indices.map_or(Selection::All, Selection::Indices);
            cmd_align(&input, &output, axis, &selection)?;
        }

        Commands::Validate { inputs, rename } => {
            cmd_validate(&inputs, rename)?;
        }

        Commands::ResetNames { inputs } => {
            cmd_reset_names(&inputs)?;
        }
    }

    Ok(())
}

fn turn_from_flag(ccw: bool) -> Turn {
    if ccw {
        Turn::CounterClockwise
    } else {
        Turn::Clockwise
    }
}

/// Create a progress reporter that prints one line per stage with the
/// time elapsed since the operation started.
fn stage_progress() -> Progress {
    let start = Instant::now();
    Progress::new(move |current, total, message| {
        eprintln!("  [{}/{}] {} ({:.2?})", current, total, message, start.elapsed());
    })
}

/// Output paths for welded objects, one per input under `output_dir`.
///
/// Inputs from different directories sharing a file name would overwrite
/// each other, so they are rejected before anything is loaded.
fn weld_outputs(inputs: &[PathBuf], output_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut seen = HashSet::new();
    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let file_name = input
            .file_name()
            .ok_or_else(|| format!("input path {} has no file name", input.display()))?;
        if !seen.insert(file_name) {
            return Err(format!(
                "several inputs are named {}; their welded copies would overwrite each other",
                file_name.to_string_lossy()
            ));
        }
        outputs.push(output_dir.join(file_name));
    }
    Ok(outputs)
}

/// `path` with its file stem replaced, keeping directory and extension.
fn with_stem(path: &Path, stem: &str) -> PathBuf {
    match path.extension() {
        Some(ext) => path.with_file_name(format!("{}.{}", stem, ext.to_string_lossy())),
        None => path.with_file_name(stem),
    }
}

/// Rename files, after checking that no target already exists.
fn rename_files(renames: &[(PathBuf, PathBuf)]) -> Result<(), Box<dyn std::error::Error>> {
    for (from, to) in renames {
        if from != to && to.exists() {
            return Err(format!("cannot rename {}: {} already exists", from.display(), to.display()).into());
        }
    }
    for (from, to) in renames {
        if from != to {
            std::fs::rename(from, to)?;
            println!("Renamed: {} -> {}", from.display(), to.display());
        }
    }
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let object = io::load(input)?;

    println!("File: {}", input.display());
    println!("Object: {}", object.name());
    println!("Vertices: {}", object.len());
    println!("Faces: {}", object.faces().len());

    if let Some((min, max)) = object.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    let positions = object.positions();
    if let Some(c) = chain::centroid(&positions) {
        println!("Centroid: ({:.3}, {:.3}, {:.3})", c.x, c.y, c.z);
    }

    println!("Edges: {}", validate::edge_count(object.faces()));
    println!("Block type: {}", validate::classify(&object));

    if !positions.is_empty() {
        let chain = chain::build_chain(&positions)?;
        if chain.is_complete() {
            println!("Chain: complete ({} links)", chain.len());
        } else {
            println!("Chain: stops after {} of {} vertices", chain.len(), chain.total());
        }
    }

    Ok(())
}

fn cmd_chain(input: &Path, epsilon: f64, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    let object = io::load(input)?;
    let options = ChainOptions::default().with_centroid_epsilon(epsilon);

    let mut chain = chain::build_chain_with_options(&object.positions(), &options)?;
    if strict {
        chain = chain.ensure_complete()?;
    }

    for (position, link) in chain.links().iter().enumerate() {
        let p = link.position;
        println!("{:4} -> {:6}  ({:.6}, {:.6}, {:.6})", position, link.index, p.x, p.y, p.z);
    }
    if !chain.is_complete() {
        log::warn!("chain covers {} of {} vertices", chain.len(), chain.total());
    }

    Ok(())
}

fn cmd_rotate(
    input: &Path,
    output: &Path,
    shift: isize,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut object = io::load(input)?;

    let mut chain = chain::build_chain(&object.positions())?;
    if strict {
        chain = chain.ensure_complete()?;
    }

    println!("Rotating {} chain links by {}...", chain.len(), shift);
    let rotated = rotate::rotate_chain(&chain, shift)?;
    let written = rotate::apply_chain(&mut object, &rotated)?;
    log::info!("wrote {} positions", written);

    io::save(&object, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_quarter_turn(input: &Path, output: &Path, turn: Turn) -> Result<(), Box<dyn std::error::Error>> {
    let mut object = io::load(input)?;

    println!("Applying {:?} quarter turn to {}...", turn, object.name());
    let ring = rotate::quarter_turn(&mut object, turn)?;
    log::info!("rotated {} rim vertices", ring.len());

    io::save(&object, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_grid_rotate(input: &Path, output: &Path, turn: Turn) -> Result<(), Box<dyn std::error::Error>> {
    let mut object = io::load(input)?;

    println!("Applying {:?} grid turn to {}...", turn, object.name());
    let moves = grid::apply_grid_rotation(&mut object, turn)?;
    log::info!("moved {} grid vertices", moves.len());

    io::save(&object, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_swap(input: &Path, output: &Path, indices: &[usize]) -> Result<(), Box<dyn std::error::Error>> {
    let mut object = io::load(input)?;

    let (first, last) = swap::swap_outer(&mut object, indices)?;
    println!("Swapped vertices {} and {}", first, last);

    io::save(&object, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_weld(
    inputs: &[PathBuf],
    output_dir: &Path,
    threshold: f64,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let outputs = weld_outputs(inputs, output_dir)?;
    let mut objects = inputs
        .iter()
        .map(io::load)
        .collect::<Result<Vec<MeshObject>, _>>()?;

    let total: usize = objects.iter().map(|o| o.len()).sum();
    println!("Loaded: {} objects, {} vertices", objects.len(), total);

    let options = WeldOptions::with_threshold(threshold).with_parallel(!sequential);
    let mode = if sequential { "sequential" } else { "parallel" };
    let progress = stage_progress();

    println!("Welding within {} ({})...", threshold, mode);
    let start = Instant::now();
    let report = weld::weld_by_distance_with_progress(&mut objects, &options, &progress)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} clusters, {} linked vertices, {} moved",
        report.clusters.len(),
        report.linked_points(),
        report.moved
    );
    log::info!("weld took {:.2?}", elapsed);

    std::fs::create_dir_all(output_dir)?;
    for (output, object) in outputs.iter().zip(&objects) {
        io::save(object, output)?;
        println!("Saved: {}", output.display());
    }

    Ok(())
}

fn cmd_snap(
    active: &Path,
    references: &[PathBuf],
    output: &Path,
    selection: &Selection,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut object = io::load(active)?;
    let references = references
        .iter()
        .map(io::load)
        .collect::<Result<Vec<MeshObject>, _>>()?;

    let options = SnapOptions::default().with_parallel(!sequential);
    let report = snap::snap_to_closest(&mut object, selection, &references, &options)?;
    println!(
        "Snapped {} vertices (max displacement {:.6})",
        report.moved, report.max_displacement
    );

    io::save(&object, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_align(input: &Path, output: &Path, axis: Axis, selection: &Selection) -> Result<(), Box<dyn std::error::Error>> {
    let mut object = io::load(input)?;

    let plane = align::align_to_axis(&mut object, selection, axis)?;
    println!("Aligned {} to {} = {:.6}", object.name(), axis, plane);

    io::save(&object, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_validate(inputs: &[PathBuf], rename: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut objects = inputs
        .iter()
        .map(io::load)
        .collect::<Result<Vec<MeshObject>, _>>()?;

    let report = if rename {
        validate::tag_objects(&mut objects)?
    } else {
        validate::validate_objects(&objects)
    };

    for (input, (_, verdict)) in inputs.iter().zip(&report.verdicts) {
        println!("{}: {}", input.display(), verdict);
    }
    println!(
        "Result: {} triblocks, {} quadblocks, {} invalid",
        report.count(Some(BlockKind::TriBlock)),
        report.count(Some(BlockKind::QuadBlock)),
        report.count(None)
    );

    if rename {
        let renames: Vec<(PathBuf, PathBuf)> = inputs
            .iter()
            .zip(&objects)
            .map(|(input, object)| (input.clone(), with_stem(input, object.name())))
            .collect();
        rename_files(&renames)?;
    }

    Ok(())
}

fn cmd_reset_names(inputs: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let renames: Vec<(PathBuf, PathBuf)> = inputs
        .iter()
        .map(|input| {
            let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
            (input.clone(), with_stem(input, validate::reset_name(&stem)))
        })
        .collect();
    rename_files(&renames)
}
