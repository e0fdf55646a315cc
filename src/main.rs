use anyhow::Result;
use clap::Parser;
use std::path::Path;

use albumist::cli::{AlbumAction, Cli, Command, PhotoAction, UserAction};
use albumist::export;
use albumist::model::{Album, SharedPhoto};
use albumist::search::SearchQuery;
use albumist::{logging, Config, Gallery, Session};

fn photo_count(count: usize) -> String {
    match count {
        1 => "1 photo".to_string(),
        n => format!("{} photos", n),
    }
}

fn print_photo(photo: &SharedPhoto) {
    let photo = photo.borrow();
    let mut line = format!("  {}  {}", photo.captured_at(), photo.path());
    if !photo.caption().is_empty() {
        line.push_str(&format!("  \"{}\"", photo.caption()));
    }
    if !photo.tags().is_empty() {
        let tags: Vec<String> = photo.tags().iter().map(|t| t.label()).collect();
        line.push_str(&format!("  [{}]", tags.join(", ")));
    }
    println!("{}", line);
}

fn print_album(album: &Album) {
    println!("{}  ({})", album.name(), photo_count(album.count()));
    if let Some(span) = album.date_range() {
        println!("  {} to {}", span.first_day(), span.last_day());
    }
}

fn export_if_requested(photos: &[SharedPhoto], export: Option<&Path>) -> Result<()> {
    if let Some(path) = export {
        let count = export::export_photos_to(photos, path)?;
        println!("Exported {} to {}", photo_count(count), path.display());
    }
    Ok(())
}

fn run_photo(gallery: &mut Gallery, user: &str, album: &str, action: PhotoAction) -> Result<()> {
    match action {
        PhotoAction::Add { path, captured_at } => {
            let photo = match captured_at {
                Some(at) => gallery.add_photo(user, album, &path.to_string_lossy(), at)?,
                None => gallery.add_photo_file(user, album, &path)?,
            };
            println!("Added to {}:", album);
            print_photo(&photo);
        }
        PhotoAction::Import { directory } => {
            let summary = gallery.import_directory(user, album, &directory)?;
            println!(
                "Imported {} into {} ({} already present, {} unreadable)",
                photo_count(summary.added),
                album,
                summary.duplicates,
                summary.failed
            );
        }
        PhotoAction::Remove { path } => {
            gallery.remove_photo(user, album, &path)?;
            println!("Removed {} from {}", path, album);
        }
        PhotoAction::Caption { path, text } => {
            gallery.set_caption(user, album, &path, &text)?;
            println!("Caption set");
        }
        PhotoAction::Tag { path, key, value } => {
            if gallery.add_tag(user, album, &path, &key, &value)? {
                println!("Tagged {} with {}: {}", path, key.trim(), value.trim());
            } else {
                println!("{} already has that tag", path);
            }
        }
        PhotoAction::Untag { path, key, value } => {
            gallery.remove_tag(user, album, &path, &key, &value)?;
            println!("Removed tag from {}", path);
        }
        PhotoAction::Copy { path, target } => {
            gallery.copy_photo(user, album, &path, &target)?;
            println!("Copied {} to {}", path, target);
        }
        PhotoAction::Move { path, target } => {
            gallery.move_photo(user, album, &path, &target)?;
            println!("Moved {} to {}", path, target);
        }
    }
    Ok(())
}

fn run_album(gallery: &mut Gallery, user: &str, action: AlbumAction) -> Result<()> {
    match action {
        AlbumAction::Create { name } => {
            let name = gallery.create_album(user, &name)?;
            println!("Created album {}", name);
        }
        AlbumAction::Delete { name } => {
            gallery.delete_album(user, &name)?;
            println!("Deleted album {}", name);
        }
        AlbumAction::Rename { old, new } => {
            gallery.rename_album(user, &old, &new)?;
            println!("Renamed {} to {}", old, new.trim());
        }
        AlbumAction::Show { name, export } => {
            let album = gallery.album(user, &name)?;
            print_album(album);
            for photo in album.photos() {
                print_photo(photo);
            }
            export_if_requested(album.photos(), export.as_deref())?;
        }
    }
    Ok(())
}

fn run(gallery: &mut Gallery, command: Command) -> Result<()> {
    match command {
        Command::Users => {
            let names = gallery.registry().usernames();
            if names.is_empty() {
                println!("No users");
            }
            for name in names {
                println!("{}", name);
            }
        }
        Command::User {
            action: UserAction::Add { name },
        } => {
            let name = gallery.create_user(&name)?;
            println!("Created user {}", name);
        }
        Command::User {
            action: UserAction::Delete { name },
        } => {
            gallery.delete_user(&name)?;
            println!("Deleted user {}", name);
        }
        Command::Login { name } => match gallery.login(&name)? {
            Session::Admin => println!("Logged in as administrator"),
            Session::User(name) => {
                println!("Logged in as {}", name);
                for album in gallery.user(&name)?.albums() {
                    print_album(album);
                }
            }
        },
        Command::Albums { user } => {
            let albums = gallery.user(&user)?.albums();
            if albums.is_empty() {
                println!("{} has no albums", user);
            }
            for album in albums {
                print_album(album);
            }
        }
        Command::Album { user, action } => run_album(gallery, &user, action)?,
        Command::Photo {
            user,
            album,
            action,
        } => run_photo(gallery, &user, &album, action)?,
        Command::Tags { user, keys } => {
            if keys {
                for key in gallery.tag_key_suggestions(&user)? {
                    println!("{}", key);
                }
            } else {
                for tag in gallery.available_tags(&user)? {
                    println!("{}", tag);
                }
            }
        }
        Command::Search {
            user,
            by,
            save_as,
            export,
        } => {
            let query = by.query();
            let results = gallery.search(&user, &query)?;
            println!("{} {}", photo_count(results.len()), query.describe());
            for photo in &results {
                print_photo(photo);
            }
            if results.is_empty() && matches!(query, SearchQuery::DateRange { .. }) {
                if let Some(span) = gallery.search_date_bounds(&user)? {
                    println!("Photos span {} to {}", span.first_day(), span.last_day());
                }
            }
            if let Some(name) = save_as {
                let name = gallery.create_album_from_results(&user, &name, &results)?;
                println!("Saved results as album {}", name);
            }
            export_if_requested(&results, export.as_deref())?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (uses journald on Linux, file fallback otherwise)
    let _ = logging::init(Some(Config::config_dir().join("logs")));

    // Load configuration
    let config = match cli.config {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    let mut gallery = Gallery::open(config)?;
    run(&mut gallery, cli.command)
}
