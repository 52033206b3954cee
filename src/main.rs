extern crate clap;
extern crate env_logger;
extern crate pairmbpt;
extern crate serde_yaml;

use std::error::Error;
use std::fs::File;
use std::str::FromStr;
use std::sync::Arc;
use clap::{AppSettings, ArgMatches, SubCommand};
use pairmbpt::basis::Basis;
use pairmbpt::op::{Op1, Op2};
use pairmbpt::{hf, mbpt, pairing};

fn arg<T>(matches: &ArgMatches, name: &str) -> Result<T, Box<dyn Error>>
    where T: FromStr,
          T::Err: Error + 'static,
{
    let value = matches.value_of(name)
        .ok_or_else(|| format!("missing argument: {}", name))?;
    Ok(value.parse()?)
}

fn make_basis(matches: &ArgMatches) -> Result<Arc<Basis>, Box<dyn Error>> {
    let num_levels: usize = arg(matches, "num_levels")?;
    println!("num_levels: {}", num_levels);
    let num_filled: usize = arg(matches, "num_filled")?;
    println!("num_filled: {}", num_filled);
    Ok(Arc::new(Basis::new(num_levels, num_filled)?))
}

fn print_mbpt(f: &Op1, gamma: &Op2) {
    let e2 = mbpt::mp2(f, gamma);
    println!("mp2_energy: {}", e2.total());
    println!("  one_body: {}", e2.e1b);
    println!("  two_body: {}", e2.e2b);

    let e3c = mbpt::mp3_canonical(f, gamma);
    let e3n = mbpt::mp3_noncanonical(f, gamma);
    println!("mp3_energy: {}", e3c.total() + e3n.total());
    println!("  pp: {}", e3c.pp);
    println!("  hh: {}", e3c.hh);
    println!("  ph: {}", e3c.ph);
    println!("  noncanonical: {}", e3n.total());
    for (k, e) in (4 ..).zip(e3n.0.iter()) {
        println!("    e{}: {}", k, e);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let level_args = "<num_levels> 'Number of doubly degenerate levels'
                      <num_filled> 'Number of occupied levels'";
    let matches = clap::App::new(env!("CARGO_PKG_NAME"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(SubCommand::with_name("basis")
                    .about("Print the single-particle basis")
                    .args_from_usage(level_args))
        .subcommand(SubCommand::with_name("mbpt")
                    .about("MBPT on top of the unrotated reference state")
                    .setting(AppSettings::AllowNegativeNumbers)
                    .args_from_usage(level_args)
                    .args_from_usage("<g> 'Pairing strength'"))
        .subcommand(SubCommand::with_name("hf-mbpt")
                    .about("MBPT on top of the Hartree-Fock reference state")
                    .setting(AppSettings::AllowNegativeNumbers)
                    .args_from_usage(level_args)
                    .args_from_usage("<g> 'Pairing strength'")
                    .args_from_usage("<g_pert> 'Pair-breaking strength'")
                    .args_from_usage("[--conf=<conf>] 'YAML file with HF settings'")
                    .args_from_usage("[--max-iter=<max-iter>] 'Maximum number of HF iterations'"))
        .get_matches();

    match matches.subcommand() {
        ("basis", Some(matches)) => {
            let basis = make_basis(matches)?;
            print!("{}", basis);
        }
        ("mbpt", Some(matches)) => {
            let basis = make_basis(matches)?;
            let g: f64 = arg(matches, "g")?;
            println!("g: {}", g);
            let (h1, h2) = pairing::hamiltonian(&basis, g);
            let (e, f, gamma) = hf::normord(&h1, &h2)?;
            println!("hf_energy: {}", e);
            print_mbpt(&f, &gamma);
        }
        ("hf-mbpt", Some(matches)) => {
            let basis = make_basis(matches)?;
            let g: f64 = arg(matches, "g")?;
            println!("g: {}", g);
            let g_pert: f64 = arg(matches, "g_pert")?;
            println!("g_pert: {}", g_pert);
            let mut conf: hf::Conf = match matches.value_of("conf") {
                Some(path) => serde_yaml::from_reader(File::open(path)?)?,
                None => Default::default(),
            };
            if matches.is_present("max-iter") {
                conf.max_iter = arg(matches, "max-iter")?;
            }
            println!("hf_conf:");
            println!("  max_iter: {}", conf.max_iter);
            println!("  toler: {}", conf.toler);
            println!("  heevr_abstol: {}", conf.heevr_abstol);

            let (h1, h2) = pairing::hamiltonian(&basis, g);
            let h2 = h2.try_add(&pairing::perturbation(&basis, g_pert))?;
            let mut run = conf.make_run(&h1, &h2)?;
            match run.do_run() {
                // keep going with whatever basis was reached
                Ok(()) | Err(hf::Error::NotConverged(_)) => {}
                Err(e) => return Err(e.into()),
            }
            println!("hf_iterations: {}", run.num_iter);
            println!("hf_converged: {}", run.status == hf::Status::Converged);
            let (e, f, gamma) = run.normord()?;
            println!("hf_energy: {}", e);
            print_mbpt(&f, &gamma);
        }
        _ => unreachable!(),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
