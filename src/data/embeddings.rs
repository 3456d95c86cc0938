// ============================================================
// Layer 4 — Word Vectors and Embedding Matrix
// ============================================================
// Loads pretrained word vectors for the corpus vocabulary and lays
// them out as the dense table the embedding layer is seeded with.
//
// Supported files:
//   - word2vec binary (.bin): "<count> <dim>\n" header, then per
//     word "<word> " followed by dim little-endian f32 values
//   - text (.txt / .vec): one "<word> v1 v2 ... vdim" per line,
//     with an optional "<count> <dim>" header line
//
// Only words present in the vocabulary are kept. The declared
// dimension is checked before any vector buffer is allocated.
//
// Unknown words:
//   Every vocabulary word the file does not know receives a vector
//   drawn from U[-0.25, 0.25]^dim, and the "<unk>" sentinel always
//   receives its own random vector.
//
// Embedding matrix layout (rows × dim):
//   row 0               → zero vector (padding)
//   row i (1..=|vocab|) → vector of the token with index i
//   remaining rows      → zero
//
// Reference: Mikolov et al. (2013) word2vec
//            Kim (2014) Convolutional Neural Networks for
//            Sentence Classification (±0.25 unknown-word init)

use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use rand::Rng;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use crate::data::vocab::{Vocabulary, UNK_TOKEN};
use crate::data::DataError;

/// Half-width of the uniform range used for unknown words
pub const UNKNOWN_RANGE: f32 = 0.25;

/// Largest vector dimension a file may declare
pub const MAX_VECTOR_DIM: usize = 10_000;

// ─── WordVectorSource ─────────────────────────────────────────────────────────
/// Any component that can provide pretrained vectors for a vocabulary.
pub trait WordVectorSource {
    /// Load vectors for the words of `vocab` that the source knows.
    /// Words absent from the source are simply missing from the result.
    fn load_for(&self, vocab: &Vocabulary) -> Result<WordVectors>;
}

// ─── WordVectors ──────────────────────────────────────────────────────────────
/// Pretrained vectors keyed by token, all of dimension `dim`.
#[derive(Debug, Clone)]
pub struct WordVectors {
    dim:     usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    pub fn new(dim: usize) -> Self {
        Self { dim, vectors: HashMap::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(word)
    }

    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) -> Result<(), DataError> {
        if vector.len() != self.dim {
            return Err(DataError::DimensionMismatch { expected: self.dim, found: vector.len() });
        }
        self.vectors.insert(word.into(), vector);
        Ok(())
    }

    /// Give every vocabulary word without a vector a random one in
    /// [-0.25, 0.25]^dim, then (re)draw the `<unk>` sentinel vector.
    /// Returns the number of vocabulary words that were added.
    pub fn add_unknown_words<R: Rng>(&mut self, vocab: &Vocabulary, rng: &mut R) -> usize {
        let mut added = 0usize;

        for (word, _) in vocab.iter() {
            if !self.vectors.contains_key(word) {
                let v = random_vector(self.dim, rng);
                self.vectors.insert(word.to_string(), v);
                added += 1;
            }
        }

        let unk = random_vector(self.dim, rng);
        self.vectors.insert(UNK_TOKEN.to_string(), unk);

        tracing::info!("Added {} unknown words to word vectors", added);
        added
    }
}

fn random_vector<R: Rng>(dim: usize, rng: &mut R) -> Vec<f32> {
    (0..dim).map(|_| rng.gen_range(-UNKNOWN_RANGE..=UNKNOWN_RANGE)).collect()
}

// ─── EmbeddingMatrix ──────────────────────────────────────────────────────────
/// Row-major `rows × dim` table used to initialise the embedding layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    rows:   usize,
    dim:    usize,
    values: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn zeros(rows: usize, dim: usize) -> Self {
        Self { rows, dim, values: vec![0.0; rows * dim] }
    }

    /// Lay out `vectors` by vocabulary index into a `rows × dim` table.
    /// Words without a vector keep a zero row.
    pub fn from_word_vectors(
        vectors: &WordVectors,
        vocab:   &Vocabulary,
        rows:    usize,
    ) -> Result<Self, DataError> {
        if rows <= vocab.len() {
            return Err(DataError::MalformedVectors(format!(
                "embedding matrix needs more than {} rows, got {}",
                vocab.len(),
                rows
            )));
        }

        let mut matrix = Self::zeros(rows, vectors.dim());
        for (word, idx) in vocab.iter() {
            if let Some(v) = vectors.get(word) {
                matrix.row_mut(idx as usize).copy_from_slice(v);
            }
        }
        Ok(matrix)
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.dim]
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.values[i * self.dim..(i + 1) * self.dim]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

// ─── Word2VecFile ─────────────────────────────────────────────────────────────
/// Pretrained vectors on disk, binary or text word2vec format.
#[derive(Debug, Clone)]
pub struct Word2VecFile {
    path:         PathBuf,
    expected_dim: Option<usize>,
}

impl Word2VecFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), expected_dim: None }
    }

    /// Fail on any file whose vectors are not `dim` wide.
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.expected_dim = Some(dim);
        self
    }

    fn is_text_format(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("txt") | Some("vec")
        )
    }
}

impl WordVectorSource for Word2VecFile {
    fn load_for(&self, vocab: &Vocabulary) -> Result<WordVectors> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open word vectors '{}'", self.path.display()))?;
        let reader = BufReader::new(file);

        let vectors = if self.is_text_format() {
            read_text_vectors(reader, vocab, self.expected_dim)
        } else {
            read_binary_vectors(reader, vocab, self.expected_dim)
        }
        .with_context(|| format!("Cannot parse word vectors '{}'", self.path.display()))?;

        tracing::info!(
            "Found {} of {} vocabulary words in pretrained vectors (dim={})",
            vectors.len(),
            vocab.len(),
            vectors.dim()
        );
        Ok(vectors)
    }
}

/// Parse the word2vec binary format, keeping only vocabulary words.
pub fn read_binary_vectors<R: BufRead>(
    mut reader:   R,
    vocab:        &Vocabulary,
    expected_dim: Option<usize>,
) -> Result<WordVectors, DataError> {
    let mut header = String::new();
    reader.read_line(&mut header)?;
    let (count, dim) = parse_header(&header)
        .ok_or_else(|| DataError::MalformedVectors(format!("bad header '{}'", header.trim())))?;
    check_dim(dim, expected_dim)?;

    let mut vectors = WordVectors::new(dim);
    let mut word    = Vec::new();
    let mut buf     = vec![0f32; dim];

    for n in 0..count {
        word.clear();
        reader.read_until(b' ', &mut word)?;
        if word.last() != Some(&b' ') {
            return Err(DataError::MalformedVectors(format!(
                "unexpected end of file after {} of {} words",
                n, count
            )));
        }
        word.pop();

        reader.read_f32_into::<LittleEndian>(&mut buf)?;

        // Some writers put a newline after each vector, some before each word
        let token = String::from_utf8_lossy(&word);
        let token = token.trim_start_matches('\n');

        if vocab.index_of(token).is_some() {
            vectors.insert(token, buf.clone())?;
        }
    }

    Ok(vectors)
}

/// Parse the text format, keeping only vocabulary words.
pub fn read_text_vectors<R: BufRead>(
    reader:       R,
    vocab:        &Vocabulary,
    expected_dim: Option<usize>,
) -> Result<WordVectors, DataError> {
    let mut vectors: Option<WordVectors> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else { continue };

        let values: Vec<f32> = parts
            .map(str::parse::<f32>)
            .collect::<Result<_, _>>()
            .map_err(|e| DataError::MalformedVectors(format!("line {}: {}", line_no + 1, e)))?;

        // "<count> <dim>" header line
        if line_no == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
            continue;
        }

        if vectors.is_none() {
            check_dim(values.len(), expected_dim)?;
        }
        let store = vectors.get_or_insert_with(|| WordVectors::new(values.len()));
        if vocab.index_of(word).is_some() {
            store.insert(word, values)?;
        } else if values.len() != store.dim() {
            return Err(DataError::DimensionMismatch { expected: store.dim(), found: values.len() });
        }
    }

    vectors.ok_or_else(|| DataError::MalformedVectors("no vectors found".to_string()))
}

fn check_dim(dim: usize, expected: Option<usize>) -> Result<(), DataError> {
    if let Some(expected) = expected {
        if dim != expected {
            return Err(DataError::DimensionMismatch { expected, found: dim });
        }
    }
    if dim == 0 || dim > MAX_VECTOR_DIM {
        return Err(DataError::MalformedVectors(format!(
            "vector dimension {} is outside 1..={}",
            dim, MAX_VECTOR_DIM
        )));
    }
    Ok(())
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let count = parts.next()?.parse().ok()?;
    let dim   = parts.next()?.parse().ok()?;
    Some((count, dim))
}
