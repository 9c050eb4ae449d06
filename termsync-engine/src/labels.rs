//! Label and property applier.
//!
//! Labels are matched on `{value, language}`. A term has exactly one
//! default label per language, and in the language the term was created in
//! that label is the term's name. A model label may only take that slot
//! when it already holds the term's name; anything else is skipped with a
//! [`ProvisionWarning::LabelLanguagePolicy`] warning.

use crate::provisioner::TaxonomyProvisioner;
use crate::report::ProvisionWarning;
use termsync_model::{Term, TermLabel};
use termsync_store::LabelInfo;
use termsync_types::{Lcid, TermStoreId};
use tracing::{debug, warn};

impl TaxonomyProvisioner<'_> {
    /// Stages label writes for `term_id` given the labels it currently has.
    ///
    /// `name_language` is the language the term was created in.
    pub(crate) fn stage_labels(
        &mut self,
        term_id: TermStoreId,
        term_name: &str,
        labels: &[TermLabel],
        current: &[LabelInfo],
        name_language: Lcid,
    ) {
        // Labels staged in this call count as present for the ones after.
        let mut known = current.to_vec();

        for label in labels {
            let value = self
                .store
                .normalize_name(&self.tokens.parse_string(&label.value));
            if value.is_empty() {
                continue;
            }
            let language = label.language;

            match known
                .iter()
                .position(|l| l.value == value && l.language == language)
            {
                Some(index) => {
                    if !label.is_default_for_language || known[index].is_default_for_language {
                        continue;
                    }
                    if violates_name_default(&known, &value, language, name_language) {
                        self.skip_label(term_name, value, language);
                        continue;
                    }
                    debug!("Promoting label '{}' ({}) on {}", value, language, term_id);
                    self.changes.set_default_label(term_id, &value, language);
                    mark_default(&mut known, &value, language);
                }
                None => {
                    if label.is_default_for_language
                        && violates_name_default(&known, &value, language, name_language)
                    {
                        self.skip_label(term_name, value, language);
                        continue;
                    }
                    debug!("Adding label '{}' ({}) on {}", value, language, term_id);
                    self.changes.create_label(
                        term_id,
                        &value,
                        language,
                        label.is_default_for_language,
                    );
                    known.push(LabelInfo {
                        value: value.clone(),
                        language,
                        is_default_for_language: false,
                    });
                    if label.is_default_for_language {
                        mark_default(&mut known, &value, language);
                    }
                }
            }
        }
    }

    /// Upserts local properties, and shared properties when `include_shared`.
    /// Values are written without comparing against the current ones.
    pub(crate) fn stage_properties(&mut self, term_id: TermStoreId, term: &Term, include_shared: bool) {
        if include_shared {
            for (key, value) in &term.shared_properties {
                let value = self.tokens.parse_string(value);
                self.changes.set_shared_property(term_id, key, value);
            }
        }
        for (key, value) in &term.local_properties {
            let value = self.tokens.parse_string(value);
            self.changes.set_local_property(term_id, key, value);
        }
    }

    fn skip_label(&mut self, term_name: &str, value: String, language: Lcid) {
        warn!(
            "Label '{}' cannot become the default for {} on '{}', skipping",
            value, language, term_name
        );
        self.report.warnings.push(ProvisionWarning::LabelLanguagePolicy {
            term: term_name.to_string(),
            label: value,
            language,
        });
    }
}

/// Whether making `value` the default for `language` would displace the
/// term's name from its default slot.
fn violates_name_default(known: &[LabelInfo], value: &str, language: Lcid, name_language: Lcid) -> bool {
    language == name_language
        && known
            .iter()
            .any(|l| l.language == language && l.is_default_for_language && l.value != value)
}

fn mark_default(known: &mut [LabelInfo], value: &str, language: Lcid) {
    for label in known.iter_mut().filter(|l| l.language == language) {
        label.is_default_for_language = label.value == value;
    }
}
