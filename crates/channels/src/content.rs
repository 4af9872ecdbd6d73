//! Campaign content generation — subject lines, body copy and A/B variants
//! per customer and segment.

use anyhow::Result;
use async_trait::async_trait;
use campaign_core::types::{CampaignContent, CustomerMetrics, EmailVariant, SegmentAssignment};
use rust_decimal::Decimal;
use tracing::debug;

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        customer: &CustomerMetrics,
        segment: &SegmentAssignment,
    ) -> Result<CampaignContent>;
}

/// Deterministic template renderer. Same inputs, same content.
pub struct TemplateContentGenerator {
    recommended_products: Vec<String>,
}

impl TemplateContentGenerator {
    pub fn new(recommended_products: Vec<String>) -> Self {
        Self {
            recommended_products,
        }
    }
}

impl Default for TemplateContentGenerator {
    fn default() -> Self {
        Self::new(vec![
            "ProBook Laptop 15\"".to_string(),
            "UltraView 4K Monitor".to_string(),
            "ErgoMax Office Chair".to_string(),
        ])
    }
}

#[async_trait]
impl ContentGenerator for TemplateContentGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(
        &self,
        customer: &CustomerMetrics,
        segment: &SegmentAssignment,
    ) -> Result<CampaignContent> {
        let seg = segment.segment.as_str();
        let spend = format_currency(customer.total_spend);

        let subject_lines = vec![
            format!("[{}] Exclusive offer for {}", seg, customer.customer_name),
            format!(
                "We noticed you haven't ordered in {} days...",
                customer.days_since_purchase
            ),
            format!("🎁 Special {} member pricing inside", seg),
            format!(
                "{}, your personalized recommendations are ready",
                customer.customer_name
            ),
            "Limited time: Premium access for valued customers like you".to_string(),
        ];

        let products = self
            .recommended_products
            .iter()
            .take(3)
            .map(|p| format!("• {}", p))
            .collect::<Vec<_>>()
            .join("\n");

        let body = format!(
            "Dear {name},\n\n\
             As one of our {seg} customers, we wanted to reach out with something special.\n\n\
             Based on your purchase history ({spend} total value), we've identified products that complement your previous orders:\n\n\
             {products}\n\n\
             We truly value your business and want to ensure you're getting maximum value.\n\n\
             Best regards,\n\
             Your Account Team\n",
            name = customer.customer_name,
            seg = seg.to_lowercase(),
            spend = spend,
            products = products,
        );

        debug!(
            customer_id = %customer.customer_id,
            segment = seg,
            "Campaign content rendered"
        );

        Ok(CampaignContent {
            variant_a: EmailVariant {
                subject: subject_lines[0].clone(),
                body: body.clone(),
            },
            variant_b: EmailVariant {
                subject: subject_lines[1].clone(),
                body: body.replace("special", "exclusive"),
            },
            subject_lines,
            body_text: body,
            cta: format!("View {} Recommendations →", seg),
            template_id: format!("template_{}", seg.to_lowercase()),
            recommended_products: self.recommended_products.clone(),
        })
    }
}

/// `$12,345.67` style rendering.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
