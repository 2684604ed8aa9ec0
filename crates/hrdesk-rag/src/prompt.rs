use crate::llm::ChatPrompt;
use crate::types::ScoredChunk;

pub const SYSTEM_TEMPLATE: &str = "You are an HR assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer \
questions about company HR policies. If you don't know the answer, say that you \
don't know. Use three sentences maximum and keep the \
answer concise and professional.\
\n\n\
{context}";

/// Stuff the retrieved chunks into the system template.
pub fn build(query: &str, retrieved: &[ScoredChunk]) -> ChatPrompt {
    let context = retrieved
        .iter()
        .map(|hit| hit.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    ChatPrompt {
        system: SYSTEM_TEMPLATE.replace("{context}", &context),
        human: query.to_owned(),
    }
}
