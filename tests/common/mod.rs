use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 5] = ["type", "pool", "name", "company", "quantity"];

/// Writes `rows` join commands against `pool` with random quantities in
/// `0..=max_quantity`, some of which are expected to be rejected.
pub fn generate_joins(path: &Path, pool: &str, rows: usize, max_quantity: u32) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    let mut rng = rand::thread_rng();

    wtr.write_record(HEADER)?;

    for i in 1..=rows {
        let quantity = rng.gen_range(0..=max_quantity);
        wtr.write_record([
            "join",
            pool,
            &format!("Member {i}"),
            "",
            &quantity.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
