//! Assemble the bundled binary SMB demo and print its process document.

use carousel_sim::demo;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let network = demo::binary_smb()?;
    let process = network.build()?;
    let schedule = network.schedule();

    println!(
        "Process '{}': {} columns, cycle time {} s",
        network.name(),
        network.n_columns(),
        schedule.cycle_time()
    );
    for (unit, flow) in process.unit_flows() {
        println!("  {unit}: {flow:.4e} m^3/s");
    }

    let document = process.document();
    println!("{}", carousel::schema::serialize(&document)?);

    Ok(())
}
