use citegraph_layout::algo::relax::{Body, max_overlap};
use citegraph_layout::{
    Graph, LayoutOptions, LayoutResult, LayoutStats, LinkSegment, PositionMap, resolve_links,
};
use serde::Serialize;
use std::io::{Read, Write};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(citegraph_layout::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<citegraph_layout::Error> for CliError {
    fn from(value: citegraph_layout::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Anchors,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    center: Option<String>,
    config: Option<String>,
    iterations: Option<usize>,
    pretty: bool,
    stats: bool,
    links: bool,
    verbose: bool,
}

#[derive(Serialize)]
struct StatsOut {
    #[serde(flatten)]
    layout: LayoutStats,
    nodes: usize,
    links_drawn: usize,
    max_overlap: f64,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    center_id: Option<&'a str>,
    positions: &'a PositionMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<&'a [LinkSegment]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<StatsOut>,
}

fn usage() -> &'static str {
    "citegraph\n\
\n\
USAGE:\n\
  citegraph [layout] [--pretty] [--center <id>] [--config <path>] [--iterations <n>] [--stats] [--no-links] [--verbose] [<path>|-]\n\
  citegraph anchors [--pretty] [--center <id>] [--config <path>] [--no-links] [--verbose] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the graph JSON is read from stdin.\n\
  - The graph document is {\"center_id\"?, \"nodes\": [...], \"links\": [...]}; --center overrides center_id.\n\
  - layout prints relaxed positions; anchors prints tree positions before relaxation.\n\
  - --config reads a JSON layout options document; omitted fields keep their defaults.\n\
  - Logs go to stderr; RUST_LOG overrides the filter (default: warn, or debug with --verbose).\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        links: true,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "anchors" => args.command = Command::Anchors,
            "--pretty" => args.pretty = true,
            "--stats" => args.stats = true,
            "--no-links" => args.links = false,
            "--verbose" | "-v" => args.verbose = true,
            "--center" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.center = Some(id.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--iterations" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.iterations =
                    Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_options(args: &Args) -> Result<LayoutOptions, CliError> {
    let mut opts = match args.config.as_deref() {
        Some(path) => LayoutOptions::from_json_str(&std::fs::read_to_string(path)?)?,
        None => LayoutOptions::default(),
    };
    if let Some(n) = args.iterations {
        opts.relax.iterations = n;
    }
    opts.validate()?;
    Ok(opts)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn residual_overlap(
    graph: &Graph,
    center: Option<&str>,
    result: &LayoutResult,
    opts: &LayoutOptions,
) -> f64 {
    let mut bodies: Vec<Body> = Vec::with_capacity(result.positions.len());
    let mut positions = Vec::with_capacity(result.positions.len());
    for (id, p) in &result.positions {
        let Some(n) = graph.nodes.iter().find(|n| &n.id == id) else {
            continue;
        };
        bodies.push(Body {
            id: id.clone(),
            bucket: n.bucket(),
            radius: opts.radius(n.size),
            pinned: Some(id.as_str()) == center,
            anchor: *p,
        });
        positions.push(*p);
    }
    max_overlap(&bodies, &positions, opts.relax.padding)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let graph = Graph::from_json_str(&text)?;
    let opts = load_options(&args)?;
    let center = args.center.as_deref().or(graph.center_id.as_deref());

    let result = match args.command {
        Command::Layout => citegraph_layout::layout(&graph, center, &opts),
        Command::Anchors => LayoutResult {
            positions: citegraph_layout::anchors(&graph, center, &opts),
            ..Default::default()
        },
    };
    if result.is_empty() && !graph.nodes.is_empty() {
        tracing::warn!(
            center = center.unwrap_or("<none>"),
            "center is missing or unknown; nothing was laid out"
        );
    }

    let segments = args
        .links
        .then(|| resolve_links(&graph.links, &result.positions));
    let stats = (args.stats && matches!(args.command, Command::Layout)).then(|| StatsOut {
        layout: result.stats,
        nodes: result.positions.len(),
        links_drawn: segments
            .as_ref()
            .map(Vec::len)
            .unwrap_or_else(|| resolve_links(&graph.links, &result.positions).len()),
        max_overlap: residual_overlap(&graph, center, &result, &opts),
    });

    let out = LayoutOut {
        center_id: center.filter(|_| !result.is_empty()),
        positions: &result.positions,
        links: segments.as_deref(),
        stats,
    };
    write_json(&out, args.pretty)
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, parse_args};

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("citegraph")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn defaults_to_layout_with_links_from_stdin() {
        let args = parse_args(&argv(&[])).expect("args");
        assert!(matches!(args.command, Command::Layout));
        assert!(args.links);
        assert!(args.input.is_none());
    }

    #[test]
    fn parses_flags_and_path() {
        let args = parse_args(&argv(&[
            "anchors",
            "--center",
            "W1",
            "--iterations",
            "7",
            "--no-links",
            "--pretty",
            "graph.json",
        ]))
        .expect("args");
        assert!(matches!(args.command, Command::Anchors));
        assert_eq!(args.center.as_deref(), Some("W1"));
        assert_eq!(args.iterations, Some(7));
        assert!(!args.links);
        assert!(args.pretty);
        assert_eq!(args.input.as_deref(), Some("graph.json"));
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(parse_args(&argv(&["--iterations", "many"])).is_err());
        assert!(parse_args(&argv(&["--center"])).is_err());
        assert!(parse_args(&argv(&["a.json", "b.json"])).is_err());
        assert!(parse_args(&argv(&["--bogus"])).is_err());
    }
}
