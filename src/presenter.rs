//! Plain-text rendering of the analysis store.
//!
//! Mirrors the four panels a user can see: idle hint, spinner, error and the
//! full result. Nothing here recomputes values; every number shown is the
//! backend's.

use crate::model::{AnalysisResult, ChartAnalysis, InvestmentAdvice, OverallScore, SentimentAnalysis};
use crate::store::{AnalysisPhase, AnalysisStore};
use crate::utils::parse_datetime;
use chrono::Local;

pub const DISCLAIMER: &str =
    "⚠️ 이 분석 결과는 참고용이며, 투자 결정은 본인의 판단에 따라 신중하게 이루어져야 합니다.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
    Other,
}

pub fn sentiment_tone(score: f64) -> Tone {
    if score >= 70.0 {
        Tone::Positive
    } else if score >= 40.0 {
        Tone::Neutral
    } else {
        Tone::Negative
    }
}

pub fn score_band(score: f64) -> ScoreBand {
    if score >= 80.0 {
        ScoreBand::Excellent
    } else if score >= 60.0 {
        ScoreBand::Good
    } else if score >= 40.0 {
        ScoreBand::Fair
    } else {
        ScoreBand::Poor
    }
}

pub fn recommendation(label: &str) -> Recommendation {
    match label.trim() {
        "매수" => Recommendation::Buy,
        "매도" => Recommendation::Sell,
        "관망" => Recommendation::Hold,
        _ => Recommendation::Other,
    }
}

/// Ties go to the downside.
pub fn dominance_label(up: f64, down: f64) -> &'static str {
    if up > down { "상승 우세" } else { "하락 우세" }
}

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "▲",
        Tone::Neutral => "■",
        Tone::Negative => "▼",
    }
}

fn band_marker(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Excellent => "◎",
        ScoreBand::Good => "○",
        ScoreBand::Fair => "△",
        ScoreBand::Poor => "✕",
    }
}

fn recommendation_marker(rec: Recommendation) -> &'static str {
    match rec {
        Recommendation::Buy => "▲",
        Recommendation::Sell => "▼",
        Recommendation::Hold => "■",
        Recommendation::Other => "·",
    }
}

/// Text bar of `width` cells for a 0..=100 value; out-of-range values are clamped.
fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Integral values print without a fraction, like the web UI did.
fn num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub fn render(store: &AnalysisStore) -> String {
    match store.phase() {
        AnalysisPhase::Analyzing => "AI가 차트를 분석하고 있습니다...".to_string(),
        AnalysisPhase::Failed(message) => format!("분석 오류\n{message}"),
        AnalysisPhase::Idle => {
            "AI 분석 결과\n차트 이미지를 업로드하면 종합 분석 결과가 표시됩니다".to_string()
        }
        AnalysisPhase::Ready(result) => render_result(result),
    }
}

pub fn render_result(result: &AnalysisResult) -> String {
    let mut lines = vec!["== AI 종합 분석 결과 ==".to_string()];

    if let Some(overall) = &result.overall_score {
        lines.push(String::new());
        render_overall(overall, &mut lines);
    }

    let p = &result.prediction;
    lines.push(String::new());
    lines.push("[가격 변동 예측]".to_string());
    lines.push(format!("  상승 확률 {:>5}% {}", num(p.up_probability), bar(p.up_probability, 20)));
    lines.push(format!("  하락 확률 {:>5}% {}", num(p.down_probability), bar(p.down_probability, 20)));
    lines.push(format!("  AI 종합 판단: {}", dominance_label(p.up_probability, p.down_probability)));

    lines.push(String::new());
    lines.push("[기술적 패턴 분석]".to_string());
    if result.technical_patterns.is_empty() {
        lines.push("  발견된 기술적 패턴이 없습니다".to_string());
    } else {
        lines.extend(result.technical_patterns.iter().map(|p| format!("  • {p}")));
    }

    let s = &result.sentiment;
    lines.push(String::new());
    lines.push("[시장 감성 분석]".to_string());
    lines.push(format!(
        "  {} {}/100 {} 현재 상태: {}",
        tone_marker(sentiment_tone(s.score)),
        num(s.score),
        bar(s.score, 20),
        s.status
    ));

    if let Some(advice) = &result.investment_advice {
        lines.push(String::new());
        render_advice(advice, &mut lines);
    }

    if let Some(chart) = &result.chart_analysis {
        lines.push(String::new());
        render_chart_detail(chart, &mut lines);
        if let Some(detail) = &result.sentiment_analysis {
            lines.push(String::new());
            render_sentiment_detail(detail, &mut lines);
        }
    }

    if let Some(ts) = &result.analysis_timestamp {
        let shown = parse_datetime(ts)
            .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| ts.clone());
        lines.push(String::new());
        lines.push(format!("분석 시간: {shown}"));
    }

    lines.push(String::new());
    lines.push(DISCLAIMER.to_string());
    lines.join("\n")
}

fn render_overall(overall: &OverallScore, lines: &mut Vec<String>) {
    let b = &overall.breakdown;
    lines.push("[종합 평가]".to_string());
    lines.push(format!(
        "  {} {}/100  등급: {}  신뢰도: {}",
        band_marker(score_band(overall.score)),
        num(overall.score),
        overall.grade,
        overall.confidence
    ));
    lines.push(format!("  차트 분석 {:>5}점 {}", num(b.chart_score), bar(b.chart_score, 20)));
    lines.push(format!("  감성 분석 {:>5}점 {}", num(b.sentiment_score), bar(b.sentiment_score, 20)));
    lines.push(format!("  패턴 분석 {:>5}점 {}", num(b.pattern_score), bar(b.pattern_score, 20)));
    lines.push("  가중치: 차트 분석 40% | 감성 분석 30% | 패턴 분석 30%".to_string());
}

fn render_advice(advice: &InvestmentAdvice, lines: &mut Vec<String>) {
    lines.push("[AI 투자 조언]".to_string());
    lines.push(format!(
        "  {} {} (신뢰도: {})",
        recommendation_marker(recommendation(&advice.recommendation)),
        advice.recommendation,
        advice.confidence
    ));
    lines.push(format!("  목표가: {}  손절가: {}", advice.target_price, advice.stop_loss));
    lines.push(format!("  투자 기간: {}  리스크: {}", advice.time_horizon, advice.risk_assessment));
    if !advice.key_reasons.is_empty() {
        lines.push("  주요 근거".to_string());
        lines.extend(advice.key_reasons.iter().map(|r| format!("    • {r}")));
    }
    if !advice.cautions.is_empty() {
        lines.push("  주의사항".to_string());
        lines.extend(advice.cautions.iter().map(|c| format!("    • {c}")));
    }
    lines.push(format!("  투자 전략: {}", advice.strategy));
}

fn render_chart_detail(chart: &ChartAnalysis, lines: &mut Vec<String>) {
    lines.push("[차트 분석 상세]".to_string());
    lines.push(format!("  추세: {}", chart.trend));
    lines.push(format!("  지지선: {}", chart.support_level));
    lines.push(format!("  저항선: {}", chart.resistance_level));
    lines.push(format!("  신뢰도: {}", chart.prediction.confidence));
    lines.push(format!("  리스크: {}", chart.risk_level));
}

fn render_sentiment_detail(detail: &SentimentAnalysis, lines: &mut Vec<String>) {
    lines.push("[감성 분석 상세]".to_string());
    lines.push(format!("  시장 감성: {}", detail.market_sentiment));
    lines.push(format!("  뉴스 감성: {}", detail.news_sentiment));
    lines.push(format!("  소셜 감성: {}", detail.social_sentiment));
    if !detail.key_factors.is_empty() {
        lines.push("  주요 요인:".to_string());
        lines.extend(detail.key_factors.iter().map(|f| format!("    • {f}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_result() -> AnalysisResult {
        serde_json::from_value(json!({
            "prediction": {"up_probability": 62, "down_probability": 38},
            "technical_patterns": ["상승 삼각형", "골든 크로스"],
            "sentiment": {"score": 72, "status": "긍정적"},
            "chart_analysis": {
                "trend": "상승",
                "support_level": "52,000",
                "resistance_level": "58,000",
                "prediction": {"up_probability": 62, "down_probability": 38, "confidence": "보통"},
                "risk_level": "보통"
            },
            "sentiment_analysis": {
                "market_sentiment": "낙관",
                "news_sentiment": "중립",
                "social_sentiment": "낙관",
                "key_factors": ["거래량 증가"]
            },
            "investment_advice": {
                "recommendation": "매수",
                "confidence": "보통",
                "key_reasons": ["지지선 반등"],
                "strategy": "분할 매수"
            },
            "overall_score": {
                "score": 66.5,
                "grade": "좋음",
                "confidence": "보통",
                "breakdown": {"chart_score": 62, "sentiment_score": 72, "pattern_score": 70}
            },
            "analysis_timestamp": "not a date"
        }))
        .unwrap()
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(sentiment_tone(70.0), Tone::Positive);
        assert_eq!(sentiment_tone(69.9), Tone::Neutral);
        assert_eq!(sentiment_tone(40.0), Tone::Neutral);
        assert_eq!(sentiment_tone(39.0), Tone::Negative);

        assert_eq!(score_band(80.0), ScoreBand::Excellent);
        assert_eq!(score_band(60.0), ScoreBand::Good);
        assert_eq!(score_band(40.0), ScoreBand::Fair);
        assert_eq!(score_band(12.0), ScoreBand::Poor);

        assert_eq!(recommendation("매수"), Recommendation::Buy);
        assert_eq!(recommendation("매도"), Recommendation::Sell);
        assert_eq!(recommendation("관망"), Recommendation::Hold);
        assert_eq!(recommendation("보유"), Recommendation::Other);
    }

    #[test]
    fn tie_goes_to_downside() {
        assert_eq!(dominance_label(50.0, 50.0), "하락 우세");
        assert_eq!(dominance_label(51.0, 49.0), "상승 우세");
    }

    #[test]
    fn bar_is_clamped() {
        assert_eq!(bar(150.0, 4), "[####]");
        assert_eq!(bar(-3.0, 4), "[----]");
        assert_eq!(bar(50.0, 4), "[##--]");
    }

    #[test]
    fn renders_each_phase() {
        let mut store = AnalysisStore::new();
        assert!(render(&store).starts_with("AI 분석 결과"));

        store.set_analyzing(true);
        assert!(render(&store).contains("분석하고 있습니다"));

        store.set_analyzing(false);
        store.set_error("bad image");
        assert_eq!(render(&store), "분석 오류\nbad image");
    }

    #[test]
    fn renders_full_result() {
        let text = render_result(&full_result());
        assert!(text.contains("66.5/100"));
        assert!(text.contains("상승 우세"));
        assert!(text.contains("• 골든 크로스"));
        assert!(text.contains("72/100"));
        assert!(text.contains("[AI 투자 조언]"));
        assert!(text.contains("주요 근거"));
        assert!(!text.contains("주의사항"));
        assert!(text.contains("지지선: 52,000"));
        assert!(text.contains("• 거래량 증가"));
        assert!(text.contains("분석 시간: not a date"));
        assert!(text.ends_with(DISCLAIMER));
    }

    #[test]
    fn minimal_result_shows_empty_pattern_notice() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "prediction": {"up_probability": 30, "down_probability": 70},
            "technical_patterns": [],
            "sentiment": {"score": 20, "status": "부정적"}
        }))
        .unwrap();
        let text = render_result(&result);
        assert!(text.contains("발견된 기술적 패턴이 없습니다"));
        assert!(text.contains("하락 우세"));
        assert!(!text.contains("[종합 평가]"));
        assert!(!text.contains("분석 시간"));
    }
}
