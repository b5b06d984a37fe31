//! Binary support-vector classifier with Platt-calibrated probabilities.
//!
//! The exported artifact carries the fitted support vectors, their dual
//! coefficients and the intercept, oriented so that a positive decision value
//! selects `classes[1]`. Probabilities follow the libsvm sigmoid fit (`prob_a`,
//! `prob_b`), which is defined on the opposite orientation.

use super::artifacts::ArtifactError;
use super::Diagnosis;
use serde::{Deserialize, Serialize};

/// Lower bound libsvm applies to pairwise probabilities.
const MIN_PROB: f64 = 1e-7;

fn default_degree() -> u32 {
    3
}

/// Kernel function and its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    Rbf {
        gamma: f64,
    },
    Poly {
        gamma: f64,
        #[serde(default)]
        coef0: f64,
        #[serde(default = "default_degree")]
        degree: u32,
    },
    Sigmoid {
        gamma: f64,
        #[serde(default)]
        coef0: f64,
    },
}

impl Kernel {
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Linear => "linear",
            Kernel::Rbf { .. } => "rbf",
            Kernel::Poly { .. } => "poly",
            Kernel::Sigmoid { .. } => "sigmoid",
        }
    }

    /// Evaluate `K(a, b)`. Both slices have the same length.
    pub fn eval(&self, a: &[f64], b: &[f64]) -> f64 {
        match *self {
            Kernel::Linear => dot(a, b),
            Kernel::Rbf { gamma } => {
                let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                (-gamma * sq).exp()
            }
            Kernel::Poly {
                gamma,
                coef0,
                degree,
            } => (gamma * dot(a, b) + coef0).powi(degree as i32),
            Kernel::Sigmoid { gamma, coef0 } => (gamma * dot(a, b) + coef0).tanh(),
        }
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            artifact: "model",
            reason,
        };
        match *self {
            Kernel::Linear => Ok(()),
            Kernel::Rbf { gamma } | Kernel::Sigmoid { gamma, .. }
                if !(gamma.is_finite() && gamma > 0.0) =>
            {
                Err(invalid(format!("kernel gamma must be positive, got {}", gamma)))
            }
            Kernel::Poly { gamma, .. } if !(gamma.is_finite() && gamma > 0.0) => {
                Err(invalid(format!("kernel gamma must be positive, got {}", gamma)))
            }
            Kernel::Poly { degree: 0, .. } => {
                Err(invalid("polynomial kernel degree must be at least 1".to_string()))
            }
            Kernel::Poly { coef0, .. } | Kernel::Sigmoid { coef0, .. } if !coef0.is_finite() => {
                Err(invalid("kernel coef0 is not finite".to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Numerically stable `1 / (1 + exp(decision * a + b))`.
fn sigmoid_predict(decision: f64, a: f64, b: f64) -> f64 {
    let f_apb = decision * a + b;
    if f_apb >= 0.0 {
        let e = (-f_apb).exp();
        e / (1.0 + e)
    } else {
        1.0 / (1.0 + f_apb.exp())
    }
}

/// On-disk shape of `model.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmArtifact {
    pub kernel: Kernel,
    pub support_vectors: Vec<Vec<f64>>,
    pub dual_coef: Vec<f64>,
    pub intercept: f64,
    pub prob_a: f64,
    pub prob_b: f64,
    pub classes: Vec<i64>,
    pub target_names: Vec<String>,
}

/// Validated classifier ready for evaluation.
#[derive(Debug, Clone)]
pub struct SvmClassifier {
    kernel: Kernel,
    support_vectors: Vec<Vec<f64>>,
    dual_coef: Vec<f64>,
    intercept: f64,
    prob_a: f64,
    prob_b: f64,
    classes: [i64; 2],
    diagnoses: [Diagnosis; 2],
}

impl SvmClassifier {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kernel: Kernel,
        support_vectors: Vec<Vec<f64>>,
        dual_coef: Vec<f64>,
        intercept: f64,
        prob_a: f64,
        prob_b: f64,
        classes: Vec<i64>,
        target_names: Vec<String>,
    ) -> Result<Self, ArtifactError> {
        Self::try_from(SvmArtifact {
            kernel,
            support_vectors,
            dual_coef,
            intercept,
            prob_a,
            prob_b,
            classes,
            target_names,
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    pub fn n_features(&self) -> usize {
        self.support_vectors.first().map_or(0, Vec::len)
    }

    pub fn classes(&self) -> [i64; 2] {
        self.classes
    }

    /// Diagnosis for position `idx` (0 or 1) of the class list.
    pub fn diagnosis_at(&self, idx: usize) -> Diagnosis {
        self.diagnoses[idx & 1]
    }

    /// Signed distance to the separating surface; positive selects `classes[1]`.
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.support_vectors
            .iter()
            .zip(&self.dual_coef)
            .map(|(sv, coef)| coef * self.kernel.eval(sv, x))
            .sum::<f64>()
            + self.intercept
    }

    /// Index into the class list chosen by the decision function. A zero
    /// decision selects `classes[1]`, matching libsvm's tie rule.
    pub fn predict_index(&self, decision: f64) -> usize {
        if decision >= 0.0 {
            1
        } else {
            0
        }
    }

    /// Platt probabilities `[p(classes[0]), p(classes[1])]` for a decision value.
    pub fn probabilities(&self, decision: f64) -> [f64; 2] {
        let p0 = sigmoid_predict(-decision, self.prob_a, self.prob_b).clamp(MIN_PROB, 1.0 - MIN_PROB);
        [p0, 1.0 - p0]
    }
}

impl TryFrom<SvmArtifact> for SvmClassifier {
    type Error = ArtifactError;

    fn try_from(artifact: SvmArtifact) -> Result<Self, Self::Error> {
        let invalid = |reason: String| ArtifactError::Invalid {
            artifact: "model",
            reason,
        };

        artifact.kernel.validate()?;

        let width = match artifact.support_vectors.first() {
            Some(sv) if !sv.is_empty() => sv.len(),
            Some(_) => return Err(invalid("support vectors are empty".to_string())),
            None => return Err(invalid("model has no support vectors".to_string())),
        };
        for (i, sv) in artifact.support_vectors.iter().enumerate() {
            if sv.len() != width {
                return Err(ArtifactError::DimensionMismatch {
                    what: "support vector",
                    expected: width,
                    actual: sv.len(),
                });
            }
            if sv.iter().any(|v| !v.is_finite()) {
                return Err(invalid(format!("support vector {} has non-finite values", i)));
            }
        }

        if artifact.dual_coef.len() != artifact.support_vectors.len() {
            return Err(ArtifactError::DimensionMismatch {
                what: "dual coefficients",
                expected: artifact.support_vectors.len(),
                actual: artifact.dual_coef.len(),
            });
        }
        if artifact.dual_coef.iter().any(|c| !c.is_finite()) {
            return Err(invalid("dual coefficients contain non-finite values".to_string()));
        }
        for (name, value) in [
            ("intercept", artifact.intercept),
            ("prob_a", artifact.prob_a),
            ("prob_b", artifact.prob_b),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{} is not finite", name)));
            }
        }

        let (classes, diagnoses) = verify_label_contract(&artifact.classes, &artifact.target_names)?;

        Ok(Self {
            kernel: artifact.kernel,
            support_vectors: artifact.support_vectors,
            dual_coef: artifact.dual_coef,
            intercept: artifact.intercept,
            prob_a: artifact.prob_a,
            prob_b: artifact.prob_b,
            classes,
            diagnoses,
        })
    }
}

/// Check that the exported class list and its names agree with [`Diagnosis`].
fn verify_label_contract(
    classes: &[i64],
    target_names: &[String],
) -> Result<([i64; 2], [Diagnosis; 2]), ArtifactError> {
    let (c0, c1) = match classes {
        [c0, c1] if c0 != c1 => (*c0, *c1),
        _ => {
            return Err(ArtifactError::LabelContract(format!(
                "expected two distinct classes, got {:?}",
                classes
            )))
        }
    };
    if target_names.len() != 2 {
        return Err(ArtifactError::LabelContract(format!(
            "expected two target names, got {}",
            target_names.len()
        )));
    }

    let mut diagnoses = [Diagnosis::Malignant; 2];
    for (idx, class) in [c0, c1].into_iter().enumerate() {
        let diagnosis = Diagnosis::from_class(class).ok_or_else(|| {
            ArtifactError::LabelContract(format!("class {} has no diagnosis", class))
        })?;
        let exported = target_names[idx].trim();
        if !exported.eq_ignore_ascii_case(diagnosis.as_str()) {
            return Err(ArtifactError::LabelContract(format!(
                "class {} is exported as '{}' but serves as '{}'",
                class, exported, diagnosis
            )));
        }
        diagnoses[idx] = diagnosis;
    }

    Ok(([c0, c1], diagnoses))
}
