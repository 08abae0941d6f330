//! logger.rs
//! Configuración del logger usando env_logger.
//! Además de consola, cada corrida escribe su propio archivo en logs/.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use env_logger::Target;

/// Duplica cada línea del log: stderr + archivo de la corrida.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Inicializa env_logger. Si `log_dir` viene, todo el output también
/// va a logs/run-<timestamp>.log. Devuelve la ruta del archivo creado.
pub fn init_logger(log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    // Podrías leer la variable RUST_LOG del entorno (por ejemplo)
    // para configurar el nivel de logs. Si no está, definimos un default.
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_env));
    builder.format_timestamp_secs();

    let mut log_path = None;
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("No se pudo crear el directorio de logs {:?}", dir))?;

        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        let path = dir.join(format!("run-{}.log", timestamp));
        let file = File::create(&path)
            .with_context(|| format!("No se pudo crear el archivo de log {:?}", path))?;

        builder.target(Target::Pipe(Box::new(TeeWriter { file })));
        log_path = Some(path);
    }

    builder.init();
    Ok(log_path)
}
