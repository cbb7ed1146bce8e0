use chrono::NaiveDate;

pub fn build_expense_prompt(today: NaiveDate) -> String {
    format!(
        r#"Você extrai despesas de mensagens curtas de WhatsApp.

Responda somente com um objeto JSON com os campos:
- "descricao" (texto)
- "valor" (número, em reais)
- "categoria" (texto, por exemplo Alimentação, Transporte, Moradia, Saúde, Outros)
- "tipo" ("fixa" ou "variavel")
- "responsavel" (nome de quem pagou, se mencionado)
- "data" (AAAA-MM-DD; hoje é {})

Omita campos que a mensagem não informa."#,
        today.format("%Y-%m-%d")
    )
}

pub fn build_analysis_system_prompt() -> String {
    "Você é um consultor tributário brasileiro. Escreva análises objetivas em português, \
     com riscos, oportunidades de economia e próximos passos para a empresa."
        .to_string()
}
