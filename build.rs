//! Build script para generar recursos de Windows

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<assembly xmlns="urn:schemas-microsoft-com:asm.v1" manifestVersion="1.0">
  <dependency>
    <dependentAssembly>
      <assemblyIdentity type="win32" name="Microsoft.Windows.Common-Controls" version="6.0.0.0"
        processorArchitecture="*" publicKeyToken="6595b64144ccf1df" language="*" />
    </dependentAssembly>
  </dependency>
</assembly>
"#;

fn main() {
    // Solo generar recursos en Windows
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        let mut res = winres::WindowsResource::new();

        // Información del producto
        res.set("ProductName", "NotifyFrame")
            .set("FileDescription", "Icono de bandeja con DPI adaptativo")
            .set("CompanyName", "Néstor")
            .set("LegalCopyright", "Copyright © 2024-2025 Néstor")
            .set("OriginalFilename", "notify-frame.exe");

        // Versión del archivo y del producto (leer de Cargo.toml)
        let version = env!("CARGO_PKG_VERSION");
        res.set("ProductVersion", version)
            .set("FileVersion", version);

        // Common Controls v6: SetWindowSubclass y compañía
        res.set_manifest(MANIFEST);

        // Compilar recursos
        if let Err(e) = res.compile() {
            eprintln!("Error compilando recursos de Windows: {}", e);
        }
    }
}
