use std::{collections::BTreeMap, env, fs, path::PathBuf, process};

use niwa::plan::{WORLD_COORDS_VERSION, io::read_plan_file};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "niwa_planinspect".to_string());

    let rest: Vec<String> = args.collect();
    if rest.is_empty() {
        print_usage(&program);
        return Err("missing plan file path".to_string());
    }

    let mut path: Option<PathBuf> = None;
    let mut list_objects = false;
    let mut kind_filter: Option<String> = None;

    let mut iter = rest.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            "--objects" => {
                list_objects = true;
            }
            "--type" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--type requires an object kind".to_string())?;
                kind_filter = Some(value);
            }
            _ => {
                if path.is_none() {
                    path = Some(PathBuf::from(arg));
                } else {
                    print_usage(&program);
                    return Err(format!("unexpected argument: {arg}"));
                }
            }
        }
    }

    let Some(path) = path else {
        print_usage(&program);
        return Err("missing plan file path".to_string());
    };

    let doc = read_plan_file(&path).map_err(|err| err.to_string())?;

    println!("File: {}", path.display());
    if let Ok(meta) = fs::metadata(&path) {
        println!("Size: {} bytes", meta.len());
    }
    println!(
        "Version: {}{}",
        doc.version,
        if doc.version < WORLD_COORDS_VERSION {
            " (legacy grid coordinates)"
        } else {
            ""
        }
    );

    let depth = doc.height_data.len();
    let width = doc.height_data.first().map(Vec::len).unwrap_or(0);
    println!("Grid: {width}x{depth} cells");

    let mut min_height = f32::INFINITY;
    let mut max_height = f32::NEG_INFINITY;
    for row in &doc.height_data {
        for &h in row {
            min_height = min_height.min(h);
            max_height = max_height.max(h);
        }
    }
    if min_height.is_finite() {
        println!("Heights: {min_height:.2} .. {max_height:.2}");
    }

    println!("Objects: {}", doc.objects.len());
    let mut per_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &doc.objects {
        *per_kind.entry(record.kind.as_str()).or_default() += 1;
    }
    if !per_kind.is_empty() {
        let kind_width = per_kind
            .keys()
            .map(|kind| kind.len())
            .max()
            .unwrap_or(4)
            .max(4);
        println!("\n{:<kind_width$}  {:>6}", "Kind", "Count");
        println!("{:-<kind_width$}  {:-<6}", "", "");
        for (kind, count) in &per_kind {
            println!("{kind:<kind_width$}  {count:>6}");
        }
    }

    if list_objects || kind_filter.is_some() {
        println!();
        for record in &doc.objects {
            if let Some(filter) = &kind_filter {
                if &record.kind != filter {
                    continue;
                }
            }
            let id = record
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let position = match (record.world_x, record.world_z) {
                (Some(x), Some(z)) => format!("({x:.2}, {z:.2})"),
                _ => match (record.grid_x, record.grid_z) {
                    (Some(x), Some(z)) => format!("cell ({x}, {z})"),
                    _ => "(no position)".to_string(),
                },
            };
            let rotation = record
                .rotation_y
                .map(|deg| format!("  yaw {deg:.0}"))
                .unwrap_or_default();
            println!("#{id:<6} {:<8} {position}{rotation}", record.kind);
        }
    }

    Ok(())
}

fn print_usage(program: &str) {
    println!("Usage: {program} <PLAN_FILE> [--objects] [--type <KIND>]");
    println!("\nOptions:");
    println!("  --objects        List every object record in the plan");
    println!("  --type <KIND>    List only objects of the given kind");
    println!("  -h, --help       Show this help message");
}
