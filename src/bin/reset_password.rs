//! A command line tool for resetting a user's password.
//!
//! Passwords can only be reset from the machine running the server, there is
//! no self-service reset flow.

use clap::Parser;
use rusqlite::Connection;

use moneta::{Email, PasswordHash, get_user_by_email, initialize_db, update_user_password};

/// Reset the password of the user with the given email address.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email address of the user whose password should be reset.
    #[arg(long)]
    email: String,
}

fn main() {
    let args = Args::parse();

    let connection = Connection::open(&args.db_path).expect("Could not open database file");
    initialize_db(&connection).expect("Could not initialize database");

    let email = Email::new(&args.email).expect("Invalid email address");
    let user = get_user_by_email(&email, &connection)
        .expect("Could not find a user with that email address");

    let password = rpassword::prompt_password("New password: ").expect("Could not read password");
    let confirmation =
        rpassword::prompt_password("Confirm new password: ").expect("Could not read password");

    if password != confirmation {
        eprintln!("The passwords do not match.");
        std::process::exit(1);
    }

    let password_hash = match PasswordHash::from_raw_password(&password, PasswordHash::DEFAULT_COST)
    {
        Ok(hash) => hash,
        Err(error) => {
            eprintln!("The password was rejected: {error}");
            std::process::exit(1);
        }
    };

    update_user_password(user.id, password_hash, &connection)
        .expect("Could not update the password");

    println!("Password updated for {email}.");
}
