extern crate pretty_env_logger;
#[macro_use]
extern crate log;

use clap::{Args, Parser, Subcommand};
use overlay_tiler::{
    BuildOptions, DistanceUnit, Job, ResizeFilter, TileMapper, TilerError,
    DEFAULT_FILENAME_TEMPLATE,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[clap(version, about = "Cut a georeferenced image into slippy map tiles")]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the tiles covered by an image
    Tile(TileArgs),
    /// Run a JSON job file
    Job { file: PathBuf },
    /// Show the tile range and canvas size for an image, without writing anything
    Info(ZoneArgs),
    /// Great-circle distance between two points
    Distance {
        #[clap(long, allow_hyphen_values = true)]
        lat1: f64,
        #[clap(long, allow_hyphen_values = true)]
        lon1: f64,
        #[clap(long, allow_hyphen_values = true)]
        lat2: f64,
        #[clap(long, allow_hyphen_values = true)]
        lon2: f64,
        #[clap(long, default_value_t = String::from("m"))]
        unit: String,
    },
}

#[derive(Args)]
struct ZoneArgs {
    #[clap(long)]
    zoom: u32,
    #[clap(long, allow_hyphen_values = true)]
    lat1: f64,
    #[clap(long, allow_hyphen_values = true)]
    lat2: f64,
    #[clap(long, allow_hyphen_values = true)]
    lon1: f64,
    #[clap(long, allow_hyphen_values = true)]
    lon2: f64,
}

#[derive(Args)]
struct TileArgs {
    #[clap(long)]
    image: PathBuf,
    #[clap(flatten)]
    zone: ZoneArgs,
    #[clap(long)]
    out: PathBuf,
    #[clap(long, default_value_t = String::from(DEFAULT_FILENAME_TEMPLATE))]
    template: String,
    /// Fail if the output folder does not exist
    #[clap(long)]
    no_create: bool,
    /// Delete the files already in the output folder
    #[clap(long)]
    clear: bool,
    #[clap(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=100))]
    opacity: u8,
    #[clap(long, value_enum, default_value_t = ResizeFilter::Lanczos3)]
    filter: ResizeFilter,
    #[clap(long, allow_hyphen_values = true, requires_all = ["mask_lat2", "mask_lon1", "mask_lon2"])]
    mask_lat1: Option<f64>,
    #[clap(long, allow_hyphen_values = true, requires_all = ["mask_lat1", "mask_lon1", "mask_lon2"])]
    mask_lat2: Option<f64>,
    #[clap(long, allow_hyphen_values = true, requires_all = ["mask_lat1", "mask_lat2", "mask_lon2"])]
    mask_lon1: Option<f64>,
    #[clap(long, allow_hyphen_values = true, requires_all = ["mask_lat1", "mask_lat2", "mask_lon1"])]
    mask_lon2: Option<f64>,
    /// Fill color outside the mask zone, as R,G,B
    #[clap(long, default_value = "0,0,0", value_parser = parse_rgb)]
    mask_color: [u8; 3],
}

fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 {
        return Err(format!("expected R,G,B, got {}", s));
    }
    let mut rgb = [0u8; 3];
    for (c, p) in rgb.iter_mut().zip(parts) {
        *c = p
            .parse()
            .map_err(|e| format!("bad color component {}: {}", p, e))?;
    }
    Ok(rgb)
}

fn run_tile(args: TileArgs) -> Result<(), TilerError> {
    let z = &args.zone;
    let mut mapper = TileMapper::new(z.zoom, &args.image, z.lat1, z.lat2, z.lon1, z.lon2)?;

    if let (Some(lat1), Some(lat2), Some(lon1), Some(lon2)) =
        (args.mask_lat1, args.mask_lat2, args.mask_lon1, args.mask_lon2)
    {
        let [r, g, b] = args.mask_color;
        mapper.set_mask_zone(lat1, lat2, lon1, lon2, r, g, b);
    }

    let options = BuildOptions {
        filename_template: args.template,
        create_folder: !args.no_create,
        clear_folder: args.clear,
        opacity: args.opacity,
        filter: args.filter,
    };
    let written = mapper.build(&args.out, &options)?;
    println!("{} tiles written to {}", written.len(), args.out.display());
    Ok(())
}

fn run_info(z: ZoneArgs) -> Result<(), TilerError> {
    let mapper = TileMapper::new(z.zoom, "", z.lat1, z.lat2, z.lon1, z.lon2)?;
    let tz = mapper.tiles_zone();

    println!("zoom:        {}", mapper.zoom());
    println!("tiles x:     {}..={}", mapper.min_tile_x(), mapper.max_tile_x());
    println!("tiles y:     {}..={}", mapper.min_tile_y(), mapper.max_tile_y());
    println!(
        "tile count:  {}x{} = {}",
        mapper.nb_tiles_x(),
        mapper.nb_tiles_y(),
        mapper.nb_tiles_x() as u64 * mapper.nb_tiles_y() as u64
    );
    println!("canvas:      {}x{} px", mapper.output_width(), mapper.output_height());
    println!("tiles zone:  {}", tz);
    println!("margins:     {:?}", mapper.image_margins());
    Ok(())
}

fn run(cli: Cli) -> Result<(), TilerError> {
    match cli.command {
        Command::Tile(args) => run_tile(args),
        Command::Job { file } => {
            let job = Job::from_file(&file)?;
            info!("Running job {}", file.display());
            let written = job.run()?;
            println!("{} tiles written to {}", written.len(), job.output.display());
            Ok(())
        }
        Command::Info(zone) => run_info(zone),
        Command::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
            unit,
        } => {
            let parsed: DistanceUnit = unit.parse()?;
            let d = overlay_tiler::haversine(lat1, lon1, lat2, lon2, parsed);
            println!("{:.3} {}", d, unit);
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose && std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "debug");
    }
    pretty_env_logger::init();

    if let Err(e) = run(cli) {
        error!("{}", e);
        process::exit(1);
    }
}
