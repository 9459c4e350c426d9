use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;

pub(crate) fn new_bar(prefix: &str, unit: &str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    let template = format!("{{prefix:.bold.dim}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} {{msg}}");
    let style = ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_prefix(prefix.to_owned());
    bar
}

/// Mirror a state channel onto `bar` until `update` reports completion or
/// the sender goes away.
pub(crate) async fn follow<T>(
    mut rx: watch::Receiver<T>,
    bar: &ProgressBar,
    mut update: impl FnMut(&T, &ProgressBar) -> bool,
) {
    while rx.changed().await.is_ok() {
        let done = update(&rx.borrow_and_update(), bar);
        if done {
            break;
        }
    }
}
