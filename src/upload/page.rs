pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="utf-8">
    <title>Gerador de Ofícios</title>
    <style>
        body { font-family: sans-serif; max-width: 36rem; margin: 4rem auto; }
        form { display: flex; flex-direction: column; gap: 1rem; }
        button { width: fit-content; padding: 0.5rem 1.5rem; }
    </style>
</head>
<body>
    <h1>Gerador de Ofícios</h1>
    <p>Envie a planilha de pagamentos. Os cabeçalhos devem estar na terceira linha,
    com as colunas <strong>N</strong>, <strong>MUNICÍPIO</strong> e <strong>VLR. TOTAL</strong>.</p>
    <form method="post" enctype="multipart/form-data">
        <input type="file" name="spreadsheet" accept=".xlsx,.xls,.xlsm,.ods" required>
        <button type="submit">Gerar ofícios</button>
    </form>
</body>
</html>
"#;
