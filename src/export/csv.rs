use std::io::Write;

use super::ExportError;
use crate::heatmap::Heatmap;

/// Write one `muscle,label,color,hex` row per muscle, in catalog order
pub fn heatmap_to_csv<W: Write>(heatmap: &Heatmap, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["muscle", "label", "color", "hex"])?;

    for (muscle, color) in heatmap.iter() {
        csv_writer.write_record([muscle.id(), muscle.label(), color.as_str(), color.hex()])?;
    }

    csv_writer.flush()?;
    Ok(())
}
