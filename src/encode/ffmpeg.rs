use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameSink, SinkConfig, ensure_dir};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::frame::{FrameRGBA, flatten_to_opaque_rgba8};

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 path.
    pub out_path: PathBuf,
    /// Replace an existing file.
    pub overwrite: bool,
    /// Color translucent pixels are flattened onto.
    pub background: [u8; 3],
}

impl FfmpegSinkOpts {
    /// Overwriting MP4 output to `out_path` over black.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: [0, 0, 0],
        }
    }
}

/// A spawned `ffmpeg` process with its stdin pipe and a thread collecting stderr.
struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    stream: SinkConfig,
    last_idx: Option<FrameIndex>,
}

impl Encoder {
    fn spawn(stream: SinkConfig, opts: &FfmpegSinkOpts) -> TesseraResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(encoder_args(&stream, opts))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TesseraError::render(format!("cannot start ffmpeg: {e}")))?;

        let (Some(stdin), Some(mut pipe)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            return Err(TesseraError::render("ffmpeg pipes unavailable"));
        };
        // A full stderr pipe stalls ffmpeg.
        let stderr = std::thread::spawn(move || {
            let mut log = Vec::new();
            pipe.read_to_end(&mut log)?;
            Ok(log)
        });

        Ok(Self {
            child,
            stdin: Some(stdin),
            stderr: Some(stderr),
            stream,
            last_idx: None,
        })
    }

    fn finish(mut self) -> TesseraResult<()> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| TesseraError::render(format!("waiting on ffmpeg failed: {e}")))?;
        let log = match self.stderr.take() {
            Some(drain) => drain
                .join()
                .map_err(|_| TesseraError::render("ffmpeg log reader panicked"))?
                .map_err(|e| TesseraError::render(format!("reading ffmpeg log failed: {e}")))?,
            None => Vec::new(),
        };
        if status.success() {
            return Ok(());
        }
        Err(TesseraError::render(format!(
            "ffmpeg failed ({status}): {}",
            String::from_utf8_lossy(&log).trim()
        )))
    }
}

/// Streams raw RGBA frames into the system `ffmpeg`, producing an H.264 MP4.
///
/// The stream size is fixed at `begin`; frames of another size are rejected.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
    scratch: Vec<u8>,
}

impl std::fmt::Debug for FfmpegSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSink")
            .field("opts", &self.opts)
            .field("stream", &self.encoder.as_ref().map(|e| e.stream))
            .finish_non_exhaustive()
    }
}

impl FfmpegSink {
    /// A sink that spawns `ffmpeg` on `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            scratch: Vec::new(),
        }
    }
}

/// Check the stream parameters `ffmpeg` with yuv420p output can accept.
pub fn validate_stream(cfg: &SinkConfig) -> TesseraResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(TesseraError::validation("video fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(TesseraError::validation(format!(
            "video size {}x{} is empty",
            cfg.width, cfg.height
        )));
    }
    if cfg.width % 2 != 0 || cfg.height % 2 != 0 {
        return Err(TesseraError::validation(format!(
            "video size {}x{} must be even for yuv420p output",
            cfg.width, cfg.height
        )));
    }
    Ok(())
}

/// Command line for a rawvideo RGBA pipe in, H.264 MP4 out.
pub(crate) fn encoder_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<String> {
    let mut args: Vec<String> = vec![
        if opts.overwrite { "-y" } else { "-n" }.into(),
        "-loglevel".into(),
        "error".into(),
        // Input options: everything before `-i` describes the pipe.
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "-s".into(),
        format!("{}x{}", cfg.width, cfg.height),
        "-r".into(),
        format!("{}/{}", cfg.fps.num, cfg.fps.den),
        "-i".into(),
        "pipe:0".into(),
    ];
    args.extend(
        [
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]
        .map(String::from),
    );
    args.push(opts.out_path.to_string_lossy().into_owned());
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> TesseraResult<()> {
        validate_stream(&cfg)?;
        if self.encoder.is_some() {
            return Err(TesseraError::render("ffmpeg sink already running"));
        }
        if let Some(parent) = self.opts.out_path.parent() {
            ensure_dir(parent)?;
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(TesseraError::validation(format!(
                "refusing to overwrite '{}'",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(TesseraError::render(
                "MP4 output needs `ffmpeg` on PATH; use a PNG sequence instead",
            ));
        }

        self.encoder = Some(Encoder::spawn(cfg, &self.opts)?);
        self.scratch.resize(cfg.width as usize * cfg.height as usize * 4, 0);
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "ffmpeg started"
        );
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TesseraResult<()> {
        let Some(enc) = self.encoder.as_mut() else {
            return Err(TesseraError::render("ffmpeg sink not started"));
        };
        if enc.last_idx.is_some_and(|last| idx <= last) {
            return Err(TesseraError::render(format!(
                "frame {} arrived after frame {}",
                idx.0,
                enc.last_idx.map_or(0, |l| l.0)
            )));
        }
        enc.last_idx = Some(idx);

        if frame.canvas() != Canvas::new(enc.stream.width, enc.stream.height) {
            return Err(TesseraError::render(format!(
                "frame is {}x{} but the video stream is {}x{}",
                frame.width, frame.height, enc.stream.width, enc.stream.height
            )));
        }
        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.background,
        )?;

        let stdin = enc
            .stdin
            .as_mut()
            .ok_or_else(|| TesseraError::render("ffmpeg stdin closed"))?;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| TesseraError::render(format!("piping frame {} to ffmpeg: {e}", idx.0)))
    }

    fn end(&mut self) -> TesseraResult<()> {
        self.encoder
            .take()
            .ok_or_else(|| TesseraError::render("ffmpeg sink not started"))?
            .finish()
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// Path with the `.mp4` extension forced, for CLI output names given without one.
pub fn mp4_path(path: &Path) -> PathBuf {
    if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
    {
        path.to_path_buf()
    } else {
        path.with_extension("mp4")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
