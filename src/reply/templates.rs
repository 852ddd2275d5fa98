//! Deterministic template replies.
//!
//! Productive messages are routed to one of a small closed set of
//! sub-intents by first-match-wins keyword lookup; each sub-intent has a
//! fixed PT-BR template. Stateless, offline, pure.

use async_trait::async_trait;

use super::ReplyGenerator;
use crate::error::LlmError;
use crate::pipeline::Category;

/// Fixed reply for `Unproductive` messages.
const NO_ACTION_REPLY: &str =
    "Obrigado pela mensagem! Não há ação necessária no momento. Permanecemos à disposição.";

/// Firm but courteous reply for input flagged by the toxicity guard.
const TOXIC_REPLY: &str = "Recebemos sua mensagem. Para que possamos ajudar, pedimos que o \
     contato mantenha um tom respeitoso. Nenhuma ação será tomada a partir deste conteúdo.";

/// Sub-intents for productive messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubIntent {
    Status,
    Password,
    Billing,
    Attachment,
    Error,
    General,
}

/// Ordered keyword groups — first match wins.
const KEYWORD_GROUPS: &[(SubIntent, &[&str])] = &[
    (SubIntent::Status, &["status", "andamento", "ticket", "chamado"]),
    (SubIntent::Password, &["senha", "reset", "acesso", "login"]),
    (
        SubIntent::Billing,
        &["fatura", "boleto", "cobrança", "pagamento", "segunda via", "2ª via"],
    ),
    (SubIntent::Attachment, &["anexo", "arquivo", "documento"]),
    (SubIntent::Error, &["erro", "bug", "falha"]),
];

impl SubIntent {
    /// Detect the sub-intent of a productive message.
    pub fn detect(text: &str) -> Self {
        let lowered = text.to_lowercase();
        for (intent, keywords) in KEYWORD_GROUPS {
            if keywords.iter().any(|k| lowered.contains(k)) {
                return *intent;
            }
        }
        Self::General
    }

    fn template(self) -> &'static str {
        match self {
            Self::Status => {
                "Olá! Obrigado pelo contato. Estamos verificando o status da sua solicitação e \
                 retornaremos em breve. Se tiver número do chamado, por favor informe."
            }
            Self::Password => {
                "Olá! Obrigado pela mensagem. Para apoiar no acesso, confirme usuário/login e, \
                 se houver, o erro exibido. Daremos sequência ao reset."
            }
            Self::Billing => {
                "Olá! Obrigado pelo contato. Encaminharemos a fatura/2ª via. Confirme o número \
                 do contrato/conta e o período desejado."
            }
            Self::Attachment => {
                "Olá! Recebemos o arquivo e vamos analisar os detalhes. Se houver pendências, \
                 retornaremos solicitando informações complementares."
            }
            Self::Error => {
                "Olá! Obrigado por reportar. Estamos avaliando o comportamento informado e \
                 retornamos com orientação ou correção."
            }
            Self::General => {
                "Olá! Obrigado pelo contato. Recebemos sua solicitação e vamos analisar os \
                 detalhes. Em breve retornaremos com próximos passos."
            }
        }
    }
}

/// Rule/template reply strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateReply;

impl TemplateReply {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReplyGenerator for TemplateReply {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(&self, category: Category, original_text: &str) -> Result<String, LlmError> {
        match category {
            Category::Unproductive => Ok(NO_ACTION_REPLY.to_string()),
            Category::Productive => Ok(SubIntent::detect(original_text).template().to_string()),
        }
    }

    async fn generate_toxic(&self, _original_text: &str) -> Result<String, LlmError> {
        Ok(TOXIC_REPLY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unproductive_gets_fixed_no_action_reply() {
        let reply = TemplateReply::new();
        let out = reply
            .generate(Category::Unproductive, "Feliz Natal! Boas festas.")
            .await
            .unwrap();
        assert_eq!(out, NO_ACTION_REPLY);
    }

    #[tokio::test]
    async fn password_request_gets_password_template() {
        let reply = TemplateReply::new();
        let out = reply
            .generate(Category::Productive, "Poderiam resetar minha senha?")
            .await
            .unwrap();
        assert!(out.contains("reset"));
        assert!(out.contains("usuário/login"));
    }

    #[test]
    fn sub_intents_detected_by_keywords() {
        assert_eq!(SubIntent::detect("qual o andamento do chamado"), SubIntent::Status);
        assert_eq!(SubIntent::detect("não consigo fazer LOGIN"), SubIntent::Password);
        assert_eq!(SubIntent::detect("preciso da segunda via do boleto"), SubIntent::Billing);
        assert_eq!(SubIntent::detect("segue o documento em anexo"), SubIntent::Attachment);
        assert_eq!(SubIntent::detect("o sistema apresenta uma falha"), SubIntent::Error);
        assert_eq!(SubIntent::detect("bom dia, tudo bem?"), SubIntent::General);
    }

    #[test]
    fn first_matching_group_wins() {
        // "status" (first group) beats "senha" (second group).
        assert_eq!(
            SubIntent::detect("status do reset de senha"),
            SubIntent::Status
        );
    }

    #[tokio::test]
    async fn generation_is_pure() {
        let reply = TemplateReply::new();
        let a = reply.generate(Category::Productive, "erro no sistema").await.unwrap();
        let b = reply.generate(Category::Productive, "erro no sistema").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn toxic_reply_is_specialized() {
        let reply = TemplateReply::new();
        let toxic = reply.generate_toxic("vocês são uns idiotas").await.unwrap();
        assert_ne!(toxic, NO_ACTION_REPLY);
        assert!(toxic.contains("respeitoso"));
    }
}
