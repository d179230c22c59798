use inquire::Select;

use crate::directory::DirectoryDescriptor;
use crate::error::{Result, SyncError};

/// Source/destination descriptors paired up for planning
#[derive(Debug, Clone, Default)]
pub struct MatchedPairs {
    pub pairs: Vec<(DirectoryDescriptor, DirectoryDescriptor)>,
    pub warnings: Vec<String>,
}

impl MatchedPairs {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Picks a destination for a source out of its syncable candidates.
pub trait DestinationChooser {
    /// Index into `candidates`
    fn choose(
        &mut self,
        source: &DirectoryDescriptor,
        candidates: &[&DirectoryDescriptor],
    ) -> Result<usize>;
}

/// Asks the operator on the terminal
#[derive(Debug, Default)]
pub struct InquireChooser;

impl DestinationChooser for InquireChooser {
    fn choose(
        &mut self,
        source: &DirectoryDescriptor,
        candidates: &[&DirectoryDescriptor],
    ) -> Result<usize> {
        let options: Vec<String> = candidates.iter().map(|c| c.root().render()).collect();
        let prompt = format!("Destination for {}:", source.root());

        let selected = Select::new(&prompt, options)
            .with_help_message("Use arrow keys to navigate, Enter to select")
            .raw_prompt()
            .map_err(|e| SyncError::Prompt(e.to_string()))?;

        log::debug!("Selected {}", selected.value);
        Ok(selected.index)
    }
}

/// Pair sources and destinations by position.
///
/// Every source needs a destination with the same sensitivity. Surplus
/// destinations are reported as warnings and otherwise ignored.
pub fn match_automatic(
    sources: &[DirectoryDescriptor],
    destinations: &[DirectoryDescriptor],
) -> Result<MatchedPairs> {
    let mut matched = MatchedPairs::default();

    for surplus in destinations.iter().skip(sources.len()) {
        let warning = format!("No source for \"{}\".", surplus.root());
        log::warn!("{warning}");
        matched.warnings.push(warning);
    }

    for (i, source) in sources.iter().enumerate() {
        let Some(destination) = destinations.get(i) else {
            return Err(SyncError::Match(format!(
                "source directory \"{}\" does not have a matching destination",
                source.root()
            )));
        };

        if !source.is_syncable_with(destination) {
            return Err(SyncError::Match(format!(
                "sensitivity mismatch: \"{}\" (sensitive={}) and \"{}\" (sensitive={}) must match",
                source.root(),
                source.is_sensitive(),
                destination.root(),
                destination.is_sensitive()
            )));
        }

        matched.pairs.push((source.clone(), destination.clone()));
    }

    log::debug!("Location matching check was successful.");
    Ok(matched)
}

/// Let the chooser pick a destination for every source.
///
/// Sources without any syncable destination are dropped.
pub fn match_manual(
    sources: &[DirectoryDescriptor],
    destinations: &[DirectoryDescriptor],
    chooser: &mut dyn DestinationChooser,
) -> Result<MatchedPairs> {
    let mut matched = MatchedPairs::default();

    for source in sources {
        let candidates: Vec<&DirectoryDescriptor> = destinations
            .iter()
            .filter(|d| source.is_syncable_with(d))
            .collect();

        if candidates.is_empty() {
            log::debug!("No syncable destinations for source: {}", source.root());
            continue;
        }

        let index = chooser.choose(source, &candidates)?;
        let destination = candidates.get(index).ok_or_else(|| {
            SyncError::Match(format!(
                "invalid destination choice {index} for \"{}\"",
                source.root()
            ))
        })?;

        matched.pairs.push((source.clone(), (*destination).clone()));
    }

    if matched.is_empty() {
        log::info!("Nothing to synchronize!");
    }

    Ok(matched)
}
