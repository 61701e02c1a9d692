use std::{env, process};

use ember_lang::Ember;

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut ember = Ember::new();

    let exit_code = match args.len() {
        n if n > 2 => {
            eprintln!("Usage: ember [script]");
            64
        }
        2 => ember.run_file(&args[1]),
        _ => ember.run_prompt(),
    };

    process::exit(exit_code);
}
