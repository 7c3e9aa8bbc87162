// Core structs: AnalysisResult and its sections, boundary errors
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the backend answered for one chart.
///
/// The three core sections must be present. Every leaf is decoded leniently:
/// `null` becomes the default, numbers are accepted where text is expected
/// and numeric text where numbers are. Keys without a typed slot are kept in
/// the `extra` map of the section they came in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub prediction: Prediction,
    #[serde(deserialize_with = "lenient::strings")]
    pub technical_patterns: Vec<String>,
    pub sentiment: Sentiment,
    #[serde(default, deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub chart_analysis: Option<ChartAnalysis>,
    #[serde(default, deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<SentimentAnalysis>,
    #[serde(default, deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub investment_advice: Option<InvestmentAdvice>,
    #[serde(default, deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<OverallScore>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient::section", skip_serializing_if = "Option::is_none")]
    pub image_metadata: Option<ImageMetadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default, deserialize_with = "lenient::number")]
    pub up_probability: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub down_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default, deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartAnalysis {
    #[serde(deserialize_with = "lenient::string")]
    pub trend: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub patterns: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub support_level: String,
    #[serde(deserialize_with = "lenient::string")]
    pub resistance_level: String,
    #[serde(deserialize_with = "lenient::object")]
    pub prediction: ChartPrediction,
    #[serde(deserialize_with = "lenient::object")]
    pub technical_indicators: TechnicalIndicators,
    #[serde(deserialize_with = "lenient::string")]
    pub risk_level: String,
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartPrediction {
    #[serde(deserialize_with = "lenient::number")]
    pub up_probability: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub down_probability: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub confidence: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalIndicators {
    #[serde(deserialize_with = "lenient::string")]
    pub rsi: String,
    #[serde(deserialize_with = "lenient::string")]
    pub macd: String,
    #[serde(deserialize_with = "lenient::string")]
    pub moving_averages: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentAnalysis {
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub key_factors: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub market_sentiment: String,
    #[serde(deserialize_with = "lenient::string")]
    pub news_sentiment: String,
    #[serde(deserialize_with = "lenient::string")]
    pub social_sentiment: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentAdvice {
    #[serde(deserialize_with = "lenient::string")]
    pub recommendation: String,
    #[serde(deserialize_with = "lenient::string")]
    pub confidence: String,
    #[serde(deserialize_with = "lenient::string")]
    pub target_price: String,
    #[serde(deserialize_with = "lenient::string")]
    pub stop_loss: String,
    #[serde(deserialize_with = "lenient::string")]
    pub time_horizon: String,
    #[serde(deserialize_with = "lenient::string")]
    pub risk_assessment: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub key_reasons: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub cautions: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub strategy: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallScore {
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub grade: String,
    #[serde(deserialize_with = "lenient::string")]
    pub confidence: String,
    #[serde(deserialize_with = "lenient::object")]
    pub breakdown: ScoreBreakdown,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBreakdown {
    #[serde(deserialize_with = "lenient::number")]
    pub chart_score: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub sentiment_score: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub pattern_score: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageMetadata {
    #[serde(deserialize_with = "lenient::string")]
    pub filename: String,
    #[serde(deserialize_with = "lenient::count")]
    pub size: u64,
    #[serde(deserialize_with = "lenient::string")]
    pub format: String,
    #[serde(deserialize_with = "lenient::dimensions")]
    pub dimensions: [u32; 2],
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Field decoders that never reject a well-formed JSON value.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn text(value: Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        }
    }

    fn to_f64(value: &Value) -> f64 {
        match value {
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            Value::String(s) => s.trim().trim_end_matches('%').trim().parse().unwrap_or_default(),
            _ => 0.0,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(Value::deserialize(d)?))
    }

    pub fn optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            other => Some(text(other)),
        })
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => Vec::new(),
            Value::Array(items) => items.into_iter().filter(|v| !v.is_null()).map(text).collect(),
            other => vec![text(other)],
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(to_f64(&Value::deserialize(d)?))
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(to_f64(&Value::deserialize(d)?).max(0.0).round() as u64)
    }

    /// `[w, h]`; missing or non-numeric sides become 0.
    pub fn dimensions<'de, D: Deserializer<'de>>(d: D) -> Result<[u32; 2], D::Error> {
        let sides = match Value::deserialize(d)? {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        let side = |i: usize| sides.get(i).map(to_f64).unwrap_or_default().max(0.0).round() as u32;
        Ok([side(0), side(1)])
    }

    /// Nested object; anything that is not an object becomes the default.
    pub fn object<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(section(d)?.unwrap_or_default())
    }

    /// Optional section; `null` or a non-object value is treated as absent.
    pub fn section<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => T::deserialize(value).ok(),
            _ => None,
        })
    }
}

/// Raw reply from the analysis backend: status plus undecoded body.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("http client error: {0}")]
    Client(String),
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("파일을 읽을 수 없습니다: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Http(String),
    #[error("분석 요청에 실패했습니다.")]
    Rejected(u16),
    #[error("분석 결과를 해석할 수 없습니다: {0}")]
    Decode(String),
}
