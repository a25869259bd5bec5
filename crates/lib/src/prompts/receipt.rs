//! # Receipt Extraction Prompts
//!
//! The instruction sent alongside the receipt image. It pins the exact JSON
//! structure the rest of the service expects, so field names here must stay in
//! sync with [`crate::constants`].

/// The default user prompt for NFC-e receipt extraction.
pub const RECEIPT_EXTRACTION_PROMPT: &str = r#"
Você é especialista em extrair dados de cupons fiscais brasileiros (NFC-e).
Analise a imagem e extraia SOMENTE as informações abaixo como JSON válido.
Extraia EXATAMENTE o que está escrito, sem adivinhar nem corrigir valores ou nomes.
Preste atenção em letras parecidas (B vs O/D, 0 vs O, 1 vs l/I) e números decimais.
Ignore ruído, transparência do papel, texto do verso ou qualquer coisa fora da lista.

Estrutura exata do JSON (não adicione nem remova campos):

{
  "nome_estabelecimento": "string (razão social ou nome fantasia)",
  "cnpj": "string (ex: 08.616.988/0005-53)",
  "itens": [
    {
      "descricao": "string (nome do produto)",
      "quantidade": "string (ex: 0,280Kg ou 1UN ou 1 caixa)",
      "preco_unitario": number,
      "preco_total": number
    }
  ],
  "valor_total": number,
  "parcelamento": number
}

Responda APENAS com o JSON válido, sem texto antes ou depois.
Se algum campo não existir, use null ou lista vazia.
"#;

/// No system prompt by default; the whole instruction travels with the image.
pub const RECEIPT_EXTRACTION_SYSTEM_PROMPT: &str = "";
