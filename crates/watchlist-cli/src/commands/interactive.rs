use super::prompts::{prompt_number, prompt_string, prompt_yes_no};
use super::watchlist::{print_watchlist, report_add, report_mark, report_remove};
use crate::output::Output;
use color_eyre::Result;
use owo_colors::OwoColorize;
use tracing::debug;
use watchlist_core::WatchlistStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    View,
    Add,
    Remove,
    MarkWatched,
    ShowUnwatched,
    ShowWatched,
    Exit,
}

impl MenuChoice {
    const ALL: [MenuChoice; 7] = [
        MenuChoice::View,
        MenuChoice::Add,
        MenuChoice::Remove,
        MenuChoice::MarkWatched,
        MenuChoice::ShowUnwatched,
        MenuChoice::ShowWatched,
        MenuChoice::Exit,
    ];

    fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    fn label(self) -> &'static str {
        match self {
            MenuChoice::View => "View Watchlist",
            MenuChoice::Add => "Add Movie",
            MenuChoice::Remove => "Remove Movie",
            MenuChoice::MarkWatched => "Mark Movie as Watched",
            MenuChoice::ShowUnwatched => "Show Unwatched Movies",
            MenuChoice::ShowWatched => "Show Watched Movies",
            MenuChoice::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoveBy {
    Number,
    Title,
    Cancel,
}

pub async fn run_interactive(store: &mut WatchlistStore, output: &Output) -> Result<()> {
    if output.is_human() {
        println!("{}", centered("Welcome to Your Watchlist", 65, '~').bright_cyan());
        println!("Track your movies so you never forget what to watch next.");
    }

    loop {
        let choice = read_menu_choice(output).await?;
        debug!(choice = ?choice, "Menu choice");

        match choice {
            MenuChoice::View => {
                print_header(choice.label());
                print_watchlist(store, output);
            }
            MenuChoice::Add => add_movies(store, output).await?,
            MenuChoice::Remove => remove_movies(store, output).await?,
            MenuChoice::MarkWatched => mark_watched(store, output).await?,
            MenuChoice::ShowUnwatched => {
                print_header(choice.label());
                print_numbered(&store.get_unwatched_movies().await, output);
            }
            MenuChoice::ShowWatched => {
                print_header(choice.label());
                print_numbered(&store.get_watched_movies().await, output);
            }
            MenuChoice::Exit => return Ok(()),
        }

        prompt_string("Return to main menu... (Press Enter to continue)").await?;
    }
}

async fn read_menu_choice(output: &Output) -> Result<MenuChoice> {
    let count = MenuChoice::ALL.len();

    println!("\nPlease choose an option:");
    for (number, choice) in MenuChoice::ALL.iter().enumerate() {
        println!("{}. {}", number + 1, choice.label());
    }

    loop {
        let picked = prompt_number(&format!("Enter your choice (1-{})", count), output).await?;
        match picked.and_then(MenuChoice::from_number) {
            Some(choice) => return Ok(choice),
            None => output.error(format!("Invalid input: Please enter a number 1-{}.", count)),
        }
    }
}

async fn add_movies(store: &mut WatchlistStore, output: &Output) -> Result<()> {
    loop {
        print_header(MenuChoice::Add.label());
        let title = prompt_string("Enter the movie title to add to your watchlist (or hit Enter to cancel)").await?;
        if title.trim().is_empty() {
            return Ok(());
        }

        report_add(store.add(&title).await, output);

        if !prompt_yes_no("Add another movie?").await? {
            return Ok(());
        }
    }
}

async fn remove_movies(store: &mut WatchlistStore, output: &Output) -> Result<()> {
    print_header(MenuChoice::Remove.label());
    print_watchlist(store, output);

    println!("\nHow would you like to remove a movie?");
    println!("1. By list number");
    println!("2. By movie title");
    println!("3. Cancel and return to main menu");

    let by = loop {
        match prompt_number("Enter your choice (1-3)", output).await? {
            Some(1) => break RemoveBy::Number,
            Some(2) => break RemoveBy::Title,
            Some(3) | None => break RemoveBy::Cancel,
            Some(_) => output.error("Invalid input: Please choose from options 1-3."),
        }
    };

    loop {
        if by == RemoveBy::Cancel {
            return Ok(());
        }
        if store.is_empty() {
            output.warn("There are no movies to remove. Your watchlist is empty.");
            return Ok(());
        }

        print_watchlist(store, output);
        let target = match by {
            RemoveBy::Number => pick_by_number(store, output).await?,
            _ => pick_by_title(store, output).await?,
        };
        let Some(title) = target else {
            return Ok(());
        };

        if prompt_yes_no(&format!("Are you sure you want to remove \"{}\" from your watchlist?", title)).await? {
            report_remove(&title, store.remove(&title).await, output);
            if store.is_empty() {
                output.info("Your watchlist is now empty.");
                return Ok(());
            }
        } else {
            output.warn(format!("\"{}\" not removed", title));
        }

        if !prompt_yes_no("Remove another movie?").await? {
            return Ok(());
        }
    }
}

async fn pick_by_number(store: &WatchlistStore, output: &Output) -> Result<Option<String>> {
    loop {
        let Some(number) =
            prompt_number("Enter the number of the movie to remove (or hit Enter to cancel)", output).await?
        else {
            return Ok(None);
        };

        match number.checked_sub(1).map(|i| store.get_at_index(i)) {
            Some(Ok(title)) => return Ok(Some(title.to_string())),
            _ => output.error("Invalid input: No movie with that number exists."),
        }
    }
}

async fn pick_by_title(store: &WatchlistStore, output: &Output) -> Result<Option<String>> {
    loop {
        let title = prompt_string("Enter the full title of the movie to remove (or hit Enter to cancel)").await?;
        if title.trim().is_empty() {
            return Ok(None);
        }

        if store.contains(&title) {
            return Ok(Some(title.trim().to_string()));
        }
        output.error(format!("No movie titled \"{}\" was found in your watchlist.", title.trim()));
    }
}

async fn mark_watched(store: &mut WatchlistStore, output: &Output) -> Result<()> {
    print_header(MenuChoice::MarkWatched.label());

    let title = prompt_string("Enter the movie title (or hit Enter to cancel)").await?;
    if title.trim().is_empty() {
        return Ok(());
    }

    let rating = loop {
        match prompt_number("Rating 1-10 (or hit Enter to skip)", output).await? {
            None => break None,
            Some(value) => match u8::try_from(value) {
                Ok(value) => break Some(value),
                Err(_) => output.error("Invalid input: Please enter a number 1-10."),
            },
        }
    };

    report_mark(&title, "watched", store.mark_as_watched(&title, rating).await, output);
    Ok(())
}

fn print_numbered(titles: &[String], output: &Output) {
    if titles.is_empty() {
        output.info("No movies to show.");
        return;
    }
    for (number, title) in titles.iter().enumerate() {
        output.info(format!("{}. {}", number + 1, title));
    }
}

fn print_header(title: &str) {
    println!("\n{}", centered(title, 65, '~').bright_white());
}

fn centered(text: &str, width: usize, fill: char) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", fill.to_string().repeat(left), text, fill.to_string().repeat(right))
}
