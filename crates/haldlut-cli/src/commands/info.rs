//! Hald LUT geometry report.

use anyhow::Result;
use haldlut_core::HaldLutImage;
use serde_json::json;

use crate::InfoArgs;

pub fn run(args: InfoArgs) -> Result<()> {
    let lut = super::resolve_lut(&args.lut, args.library.as_deref())?.with_layout(args.layout.into());
    let report = describe(&lut, args.dimension);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

fn describe(lut: &HaldLutImage, dimension: Option<u32>) -> serde_json::Value {
    let (width, height) = lut.image().dimensions();
    let inferred = lut.inferred_dimension();
    let mut report = json!({
        "name": lut.name(),
        "width": width,
        "height": height,
        "layout": lut.layout(),
        "identity": lut.identity().to_string(),
        "inferred_dimension": inferred,
    });
    if let Some(d) = dimension.or(inferred) {
        report["dimension"] = json!(d);
        report["undersized"] = json!(lut.is_undersized(d));
        if lut.layout() == haldlut_core::HaldLayout::Tiled8x8 {
            report["expected_side"] = json!(HaldLutImage::expected_side(d));
        }
    }
    report
}

fn print_text(report: &serde_json::Value) {
    let Some(fields) = report.as_object() else {
        return;
    };
    for (key, value) in fields {
        match value {
            serde_json::Value::Null => println!("{key:>18}: -"),
            serde_json::Value::String(s) => println!("{key:>18}: {s}"),
            other => println!("{key:>18}: {other}"),
        }
    }
}
