use crate::core::models::structure::Structure;
use crate::engine::classify::{BinTable, PairType, classify, link_density};
use crate::engine::config::ClassifierConfig;
use crate::engine::contacts::{Contact, detect_contacts};
use crate::engine::error::EngineError;
use crate::engine::features::{FeatureVector, build_feature_vector};
use crate::engine::predictor::{InterfaceClass, Prediction, Predictor};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::selection::SelectionGroups;
use itertools::Itertools;
use serde::Serialize;
use std::io::Write;
use tracing::{info, instrument};

/// Everything computed by one call to [`InterfaceClassifier::predict`].
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub groups: SelectionGroups,
    pub contacts: Vec<Contact>,
    pub bins: BinTable,
    pub link_density: f64,
    pub features: FeatureVector,
    pub prediction: Prediction,
}

#[derive(Debug, Clone)]
enum State {
    Unevaluated,
    Evaluated(Box<Evaluation>),
}

/// Serialisable summary of a classified interface.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRecord {
    pub structure: String,
    pub selection: Vec<String>,
    #[serde(rename = "ICs")]
    pub ics: usize,
    pub link_density: f64,
    pub predicted_class: (InterfaceClass, f64, f64),
    #[serde(flatten)]
    pub bins: BinTable,
}

/// Classifies the interface(s) of one structure as biological or
/// crystallographic.
#[derive(Debug, Clone)]
pub struct InterfaceClassifier<'a> {
    structure: &'a Structure,
    tokens: Option<Vec<String>>,
    selection: Vec<String>,
    state: State,
}

impl<'a> InterfaceClassifier<'a> {
    /// Without selection tokens every chain is its own molecule.
    pub fn new(structure: &'a Structure, selection: Option<Vec<String>>) -> Self {
        let tokens = selection.filter(|tokens| !tokens.is_empty());
        let selection = match &tokens {
            Some(tokens) => tokens.clone(),
            None => structure
                .chains_iter()
                .map(|(_, chain)| chain.id.clone())
                .collect(),
        };
        Self {
            structure,
            tokens,
            selection,
            state: State::Unevaluated,
        }
    }

    pub fn structure(&self) -> &Structure {
        self.structure
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Runs the full analysis. Calling it again recomputes everything; if that
    /// fails, the previous evaluation stays in place.
    #[instrument(skip_all, name = "classification_workflow", fields(structure = %self.structure.name()))]
    pub fn predict<P: Predictor + ?Sized>(
        &mut self,
        config: &ClassifierConfig,
        predictor: &P,
        reporter: &ProgressReporter,
    ) -> Result<&Evaluation, EngineError> {
        config.validate()?;

        reporter.report(Progress::PhaseStart { name: "Contacts" });
        let groups = SelectionGroups::resolve(self.structure, self.tokens.as_deref())?;
        let contacts = detect_contacts(self.structure, &groups, config.distance_cutoff)?;
        reporter.report(Progress::Message(format!(
            "{} intermolecular contacts",
            contacts.len()
        )));
        reporter.report(Progress::PhaseFinish);

        reporter.report(Progress::PhaseStart {
            name: "Classification",
        });
        let bins = classify(self.structure, &contacts)?;
        let link_density = link_density(&contacts)?;
        let features = build_feature_vector(&bins, link_density);
        reporter.report(Progress::PhaseFinish);

        reporter.report(Progress::PhaseStart { name: "Prediction" });
        let probabilities = predictor.predict_proba(&features)?;
        let prediction = Prediction::from_probabilities(probabilities)?;
        reporter.report(Progress::PhaseFinish);

        info!(
            contacts = contacts.len(),
            link_density,
            class = %prediction.class,
            "Interface classified."
        );

        self.state = State::Evaluated(Box::new(Evaluation {
            groups,
            contacts,
            bins,
            link_density,
            features,
            prediction,
        }));
        self.evaluation()
    }

    pub fn evaluation(&self) -> Result<&Evaluation, EngineError> {
        match &self.state {
            State::Evaluated(evaluation) => Ok(evaluation),
            State::Unevaluated => Err(EngineError::NotEvaluated),
        }
    }

    pub fn as_record(&self) -> Result<ClassificationRecord, EngineError> {
        let evaluation = self.evaluation()?;
        let [p_bio, p_xtal] = evaluation.prediction.probabilities;
        Ok(ClassificationRecord {
            structure: self.structure.name().to_string(),
            selection: self.selection.clone(),
            ics: evaluation.contacts.len(),
            link_density: evaluation.link_density,
            predicted_class: (evaluation.prediction.class, p_bio, p_xtal),
            bins: evaluation.bins.clone(),
        })
    }

    /// The human-readable report, one entry per line.
    pub fn report(&self) -> Result<Vec<String>, EngineError> {
        let evaluation = self.evaluation()?;
        let bins = &evaluation.bins;
        let [p_bio, p_xtal] = evaluation.prediction.probabilities;

        let mut lines = vec![
            format!("[+] Selection: {}", self.selection.iter().join(", ")),
            format!(
                "[+] No. of intermolecular contacts: {}",
                evaluation.contacts.len()
            ),
        ];
        for pair in [
            PairType::ChargedCharged,
            PairType::ChargedPolar,
            PairType::ApolarCharged,
            PairType::PolarPolar,
            PairType::ApolarPolar,
            PairType::ApolarApolar,
        ] {
            lines.push(format!(
                "[+] No. of {} contacts: {}",
                pair.description(),
                bins.pair(pair)
            ));
        }
        lines.push(format!("[+] Link density: {:.2}", evaluation.link_density));
        lines.push(format!(
            "[+] Class: {} {} {}",
            evaluation.prediction.class, p_bio, p_xtal
        ));
        Ok(lines)
    }

    /// One-line summary: structure name, class and both probabilities, as in
    /// `[+] 1brs\tBIO 0.804 0.196`.
    ///
    /// The probabilities follow the label space-separated. Older tooling printed
    /// a tuple here (`[+] 1brs\t('BIO', 0.804, 0.196)`), so scripts parsing that
    /// form need adjusting.
    pub fn summary_line(&self) -> Result<String, EngineError> {
        let evaluation = self.evaluation()?;
        let [p_bio, p_xtal] = evaluation.prediction.probabilities;
        Ok(format!(
            "[+] {}\t{} {} {}",
            self.structure.name(),
            evaluation.prediction.class,
            p_bio,
            p_xtal
        ))
    }

    /// Writes the contact list as tab-separated
    /// `chain resname number chain resname number` lines. The first residue of
    /// each line belongs to the first selection group whenever possible.
    pub fn write_contacts(&self, writer: &mut impl Write) -> Result<(), EngineError> {
        let evaluation = self.evaluation()?;
        for contact in &evaluation.contacts {
            let (Some(mut first), Some(mut second)) = (
                self.structure.residue_label(contact.residue_i),
                self.structure.residue_label(contact.residue_j),
            ) else {
                return Err(EngineError::Internal(
                    "contact refers to a residue outside the structure".into(),
                ));
            };
            if !evaluation.groups.first_group_contains(&first.chain) {
                std::mem::swap(&mut first, &mut second);
            }
            writeln!(
                writer,
                "{}\t{}\t{}{}\t{}\t{}\t{}{}",
                first.chain,
                first.name,
                first.number,
                first.insertion_code.map(String::from).unwrap_or_default(),
                second.chain,
                second.name,
                second.number,
                second.insertion_code.map(String::from).unwrap_or_default(),
            )?;
        }
        Ok(())
    }
}
