/// Token the extraction prompt asks the model to emit when a section has nothing relevant.
pub const NOT_FOUND_SENTINEL: &str = "NO_DIRECT_CONTENT_FOUND";

pub const EXTRACTION_PROMPT: &str = r#"你的身份是一個自動化的、沒有感情的文字提取機器人。
你的唯一任務是：在下方提供的「工作表內容」中，僅找出與「主要查詢的原料名稱」最直接相關的【一個或多個簡短文字片段、句子或列表項】。

主要查詢的原料名稱：【{subjects}】
(使用者同時提及的相關詞彙，僅供你理解上下文，不用於提取：{descriptors})

工作表內容：
```markdown
{content}
```

---
**嚴格輸出規則 (ABSOLUTE RULES):**

1.  **精確提取**: 只輸出包含「主要查詢的原料名稱」的句子、操作步驟或其非常緊密的上下文。範圍越小越好。
2.  **【直接輸出原文】**: 你的輸出**必須**直接就是從「工作表內容」中複製出來的文字，一字不改。
3.  **【嚴格禁止】添加任何額外文字**: 不允許任何解釋性或總結性的文字，例如 "根據文件..." 或 "以下是找到的相關內容："。
4.  **【嚴格禁止】提取元信息**: 不得包含 '## 工作表: ...' 標題，或 '製表日期'、'製表人' 等頁腳資訊。
5.  **找不到內容的處理**: 如果找不到任何直接相關的內容，你的唯一輸出**必須**是：`NO_DIRECT_CONTENT_FOUND`
6.  **輸出格式**: 直接輸出文字即可，不要使用 markdown 的 ``` 區塊包圍。

直接開始輸出你找到的原文片段。"#;

pub const SYNTHESIS_PROMPT: &str = r#"您是一位SOP內容整理員。請將下方已從SOP文件中提取出的、與指定原料相關的【多個獨立的簡短文字片段】，整理成一個【極簡的、統一格式的數字編號列表】。
使用者主要查詢的原料名稱為【{subjects}】。(使用者查詢時提及的相關詞彙，供您理解上下文：{descriptors})

已提取的相關SOP片段 (請將它們視為獨立的資訊點)：
---
{spans}
---

輸出要求：
1.  **【核心任務】：** 每一個獨立的資訊點、操作步驟或注意事項，作為列表中的一個項目。
2.  **【格式統一】：** 使用從 1. 開始的數字編號列表。
3.  **【原文呈現】：** 直接使用片段中的原文表述，【嚴格禁止】改寫、摘要或歸納。
4.  **【極簡輸出】：** 輸出必須直接是列表本身，不得包含前言、標題或結語。
5.  如果多個片段資訊重複，只保留一個最清晰的。
6.  使用**繁體中文**。
請直接開始輸出列表："#;

/// Prompts that the optimizer reviews against failed test cases.
pub const OPTIMIZABLE_PROMPTS: &[(&str, &str)] = &[
    ("Extractor Prompt (第一階段：文字提取)", EXTRACTION_PROMPT),
    ("Synthesizer Prompt (第二階段：結果整合)", SYNTHESIS_PROMPT),
];

pub const QA_GENERATION_PROMPT: &str = r#"你的身份是一位資深的企業內部訓練講師與品保工程師。
你的任務是為【單一的】標準作業流程 (SOP) 文件【區塊】設計一份嚴格的測驗題庫。

請仔細閱讀以下提供的【單一SOP區塊內容】，並生成 1 到 2 組高品質的「問題」與「標準答案」。

要求：
1.  **問題設計**: 問題必須精準地針對此區塊的內容，涵蓋關鍵細節、操作順序或注意事項。
2.  **答案品質**: 標準答案必須【直接源於】提供的區塊內容，力求精確。
3.  **格式**: 只輸出一個 JSON 物件，格式如下，不得有其他文字：
{"qa_pairs": [{"question": "問題", "golden_answer": "標準答案"}]}

單一SOP區塊內容如下：
---
{section}
---"#;

pub const JUDGE_PROMPT: &str = r#"你的身份是一位客觀、嚴謹、吹毛求疵的AI模型評審員。
你的任務是根據「黃金標準答案」，來評估「受測系統的實際答案」的表現，不得有任何偏袒。

**評估維度:**
1.  **準確度 (accuracy_score)**: 實際答案是否包含任何與黃金答案相悖的、錯誤的、或無中生有的資訊？完全準確為 1.0，完全錯誤為 0.0。
2.  **完整度 (completeness_score)**: 實際答案是否涵蓋了黃金答案中的所有關鍵要點？完全涵蓋為 1.0，完全沒有提到為 0.0。

**待評估的資料如下:**
---
- **問題**: {question}
- **黃金標準答案**: {golden_answer}
- **受測系統的實際答案**: {actual_answer}
---

只輸出一個 JSON 物件，不得有其他任何文字：
{"accuracy_score": 0.0, "completeness_score": 0.0, "explanation": "評分原因與實際答案的優缺點"}"#;

pub const OPTIMIZER_PROMPT: &str = r#"你的身份是一位世界頂尖的提示工程 (Prompt Engineering) 專家。
一個 RAG (檢索增強生成) 系統在回答問題時表現不佳，你的任務是分析一系列失敗案例，並對系統使用的【原始 Prompt】提出具體的、可執行的修改建議。

**你的分析目標：【原始 Prompt】**
```text
{prompt}
```

**失敗案例分析：**
{cases}

**輸出要求：**
產出一份【Prompt 優化報告】，包含以下三個部分，並使用 Markdown 標題：

### 1. 問題根源分析 (Root Cause Analysis)
### 2. 具體修改建議 (Actionable Suggestions)
### 3. 優化後的完整 Prompt (Optimized Full Prompt)"#;

/// Fill `{name}` placeholders. Values are inserted verbatim, so a value that
/// itself contains a placeholder name is never re-expanded.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
