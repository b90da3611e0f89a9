//! Clip assembly.
//!
//! Groups parsed frames into named clips by the animation tag embedded in
//! their labels and decides each clip's loop policy from the non-looping
//! rules.
//!
//! Labels follow `<baseName>_<animationTag>_<frameIndex>`. The parser has
//! already removed the index; this module splits what remains.

use std::path::Path;

use spriteport_spec::{
    AnimationClipData, CompiledRules, ImportError, PipelineResult, RuleMatch, SourceFrame,
};

/// Output of one assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// Clips in order of first appearance of their tag.
    pub clips: Vec<AnimationClipData>,
    /// One entry per rule, in registration order.
    pub rule_matches: Vec<RuleMatch>,
    /// Labels of frames that could not be segmented.
    pub skipped: Vec<String>,
}

/// Extracts the animation tag from a label stem (the label without its
/// frame index).
///
/// Returns `None` for an empty stem, and `Some("")` when the stem carries no
/// tag. A stem without any `_` is taken to be a bare base name.
///
/// ```
/// use spriteport_import::assembler::split_tag;
///
/// assert_eq!(split_tag("hero_walk_left", "hero"), Some("walk_left"));
/// assert_eq!(split_tag("knight_walk", "hero"), Some("walk"));
/// assert_eq!(split_tag("hero", "hero"), Some(""));
/// assert_eq!(split_tag("", "hero"), None);
/// ```
pub fn split_tag<'a>(stem: &'a str, base_name: &str) -> Option<&'a str> {
    if stem.is_empty() {
        return None;
    }
    if stem == base_name {
        return Some("");
    }
    if let Some(rest) = stem
        .strip_prefix(base_name)
        .and_then(|rest| rest.strip_prefix('_'))
    {
        return Some(rest);
    }
    match stem.split_once('_') {
        Some((_, tag)) => Some(tag),
        None => Some(""),
    }
}

/// Partitions `frames` into clips.
///
/// Frames with an empty tag go to a clip named `base_name`. Fails with
/// [`ImportError::EmptyClipSet`] when no frame could be segmented.
pub fn assemble(
    source: &Path,
    base_name: &str,
    frames: &[SourceFrame],
    rules: &CompiledRules,
) -> PipelineResult<Assembly> {
    let mut groups: Vec<(String, Vec<SourceFrame>)> = Vec::new();
    let mut skipped = Vec::new();

    for frame in frames {
        let stem = label_stem(&frame.source_name);
        let Some(tag) = split_tag(stem, base_name) else {
            skipped.push(frame.source_name.clone());
            continue;
        };
        let clip_name = if tag.is_empty() { base_name } else { tag };

        match groups.iter_mut().find(|(name, _)| name == clip_name) {
            Some((_, group)) => group.push(frame.clone()),
            None => groups.push((clip_name.to_string(), vec![frame.clone()])),
        }
    }

    if groups.is_empty() {
        return Err(ImportError::EmptyClipSet {
            path: source.to_path_buf(),
        });
    }

    let mut rule_matches: Vec<RuleMatch> = rules
        .iter()
        .map(|rule| RuleMatch {
            rule: rule.source.clone(),
            literal: rule.is_literal(),
            clips: Vec::new(),
        })
        .collect();

    let clips = groups
        .into_iter()
        .map(|(name, mut frames)| {
            frames.sort_by_key(|f| f.sequence_index);
            let first = rules.first_match(&name);
            if let Some(entry) = first.and_then(|i| rule_matches.get_mut(i)) {
                entry.clips.push(name.clone());
            }
            AnimationClipData {
                loops: first.is_none(),
                name,
                frames,
            }
        })
        .collect();

    Ok(Assembly {
        clips,
        rule_matches,
        skipped,
    })
}

/// The label without its trailing frame index.
///
/// Parsed frames always carry a numeric index, so the stem is everything
/// before the last separator once any source extension is gone.
fn label_stem(label: &str) -> &str {
    spriteport_spec::frame::split_frame_label(label)
        .map(|(stem, _)| stem)
        .unwrap_or(label)
}
