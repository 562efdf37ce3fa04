use clap::Parser;
use incline::Method;
use std::path::PathBuf;

/// Annotate path network edges with incline sampled from elevation
/// tiles.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Nodes GeoJSON file.
    #[arg(long)]
    pub nodes: PathBuf,

    /// Edges GeoJSON file.
    #[arg(long)]
    pub edges: PathBuf,

    /// Points GeoJSON output file.
    ///
    /// Nodes flagged `is_point` are written here. Without it they are
    /// dropped from the output.
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// GeoTIFF elevation tiles, or directories containing them.
    #[arg(long, required = true, num_args = 1..)]
    pub dem: Vec<PathBuf>,

    /// Directory to write output files to.
    ///
    /// Input files are rewritten in place when omitted.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Elevation interpolation method [idw, bilinear, spline].
    #[arg(short, long, default_value_t = Method::Idw)]
    pub method: Method,

    /// Decimal digits kept in computed inclines.
    #[arg(short, long, default_value_t = 3)]
    pub precision: u32,

    /// Multiplier applied to sampled elevations.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// UTM zone used to measure edge length.
    #[arg(long, default_value_t = 10)]
    pub utm_zone: u8,

    /// Use the southern hemisphere variant of `utm_zone`.
    #[arg(long, default_value_t = false)]
    pub south: bool,

    /// Keep inclines already present on input edges.
    #[arg(long, default_value_t = false)]
    pub skip_existing: bool,

    /// Compute each tile's edges in parallel.
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
}
