//! Interactive list prompts

use crate::exceptions::Result;
use dialoguer::{Select, theme::ColorfulTheme};

/// User decision after the editor has been closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostEditChoice {
    /// Reconcile and rebuild the output image
    Proceed,
    /// Relaunch the editor against the same working tree
    RetryEdit,
    /// Quit immediately, leaving trees on disk
    Abort,
}

/// Pick one image from several candidates
pub fn pick_image(images: &[String]) -> Result<String> {
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Please select from the following ROMs:")
        .items(images)
        .default(0)
        .interact()?;

    Ok(images[selection].clone())
}

/// Tell the user nothing was found; the caller exits afterwards
pub fn acknowledge_no_images() -> Result<()> {
    Select::with_theme(&ColorfulTheme::default())
        .with_prompt(
            "No ROMs were found. Please move one into the same folder as lunahack. \
             The program will now exit.",
        )
        .items(&["Shoot."])
        .default(0)
        .interact()?;

    Ok(())
}

/// Three-way decision once the editor process has exited
pub fn post_edit_choice(editor: &str) -> Result<PostEditChoice> {
    let items = [
        "Yes please!".to_string(),
        format!("No, bring me back to {editor}."),
        "No, I want to quit.".to_string(),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "{editor} has been closed. Are you ready to rebuild the modded ROM?"
        ))
        .items(&items)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 => PostEditChoice::Proceed,
        1 => PostEditChoice::RetryEdit,
        _ => PostEditChoice::Abort,
    })
}
