// Inference model. The trait is the seam between the request pipeline and
// the network so tests can substitute a fixed-output model.
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, anyhow, ensure};
use candle_core::{Device, Tensor};
use candle_nn::{Conv2d, Conv2dConfig, Linear, Module};
use ndarray::Array4;

use crate::preprocess::IMAGE_SIZE;

pub trait Model: Send + Sync {
    /// Maps a (1, 224, 224, 3) image tensor to one unnormalized score per
    /// class index.
    fn infer(&self, input: &Array4<f32>) -> anyhow::Result<Vec<f32>>;

    fn num_classes(&self) -> usize;
}

/// The trained food classifier: the offline conversion of the Keras model
/// into a safetensors artifact, rebuilt layer by layer. Input rescaling
/// (x / 255) is the network's own first step, mirroring the original
/// model's embedded rescaling layer.
#[derive(Debug)]
pub struct CnnClassifier {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    fc1: Linear,
    head: Linear,
    num_classes: usize,
}

impl CnnClassifier {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let tensors = candle_core::safetensors::load(path, &Device::Cpu)
            .with_context(|| format!("failed to load model from {}", path.display()))?;
        Self::from_tensors(tensors)
    }

    pub fn from_tensors(tensors: HashMap<String, Tensor>) -> anyhow::Result<Self> {
        let tensor = |name: &str| {
            tensors
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("model artifact is missing tensor '{name}'"))
        };
        let conv = |name: &str| -> anyhow::Result<Conv2d> {
            let config = Conv2dConfig { padding: 1, ..Default::default() };
            Ok(Conv2d::new(
                tensor(&format!("{name}.weight"))?,
                Some(tensor(&format!("{name}.bias"))?),
                config,
            ))
        };

        let head_weight = tensor("head.weight")?;
        let num_classes = head_weight.dim(0)?;
        ensure!(num_classes > 0, "model head has no output classes");

        Ok(Self {
            conv1: conv("conv1")?,
            conv2: conv("conv2")?,
            conv3: conv("conv3")?,
            fc1: Linear::new(tensor("fc1.weight")?, Some(tensor("fc1.bias")?)),
            head: Linear::new(head_weight, Some(tensor("head.bias")?)),
            num_classes,
        })
    }

    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        // NHWC input, rescale, then NCHW for the conv stack.
        let x = x.affine(1.0 / 255.0, 0.0)?.permute((0, 3, 1, 2))?;
        let x = self.conv1.forward(&x)?.relu()?.max_pool2d(2)?;
        let x = self.conv2.forward(&x)?.relu()?.max_pool2d(2)?;
        let x = self.conv3.forward(&x)?.relu()?.max_pool2d(2)?;
        let x = self.fc1.forward(&x.flatten_from(1)?)?.relu()?;
        self.head.forward(&x)
    }
}

impl Model for CnnClassifier {
    fn infer(&self, input: &Array4<f32>) -> anyhow::Result<Vec<f32>> {
        let size = IMAGE_SIZE as usize;
        ensure!(
            input.dim() == (1, size, size, 3),
            "expected input shape (1, {size}, {size}, 3), got {:?}",
            input.dim()
        );
        let data: Vec<f32> = input.iter().copied().collect();
        let x = Tensor::from_vec(data, (1, size, size, 3), &Device::Cpu)?;
        let scores = self.forward(&x)?.squeeze(0)?.to_vec1::<f32>()?;
        Ok(scores)
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

/// Numerically stable softmax. Purely for probability interpretation; it
/// never changes which index is largest.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
}
