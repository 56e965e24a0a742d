use crate::cli::AeffArgs;
use crate::error::Result;
use irfkit::aeff::Aeff;
use irfkit::irfs::IrfRegistry;
use tracing::info;

pub fn run(args: &AeffArgs) -> Result<()> {
    let mut registry = IrfRegistry::new();
    let count = registry.load_manifest(&args.manifest)?;
    info!(
        "Loaded {} IRF entries from '{}'.",
        count,
        args.manifest.display()
    );

    let aeff = Aeff::new(&registry, &args.irf)?;

    let sections: Vec<i32> = match args.conversion_type {
        Some(ct) => vec![ct],
        None => vec![0, 1],
    };
    for ct in sections {
        let value = aeff.value_with_phi(args.energy, args.theta, ct, args.phi)?;
        let section = if ct == 0 { "FRONT" } else { "BACK" };
        println!(
            "{}::{}  E = {} MeV  theta = {} deg  phi = {} deg  Aeff = {:.3} cm^2",
            args.irf, section, args.energy, args.theta, args.phi, value
        );
    }
    Ok(())
}
