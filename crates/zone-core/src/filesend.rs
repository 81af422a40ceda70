// filesend.rs — File Send (C12). spec.md §4.11.
//
// Converted from: myq2-server/src/sv_send.rs's download-chunking path
// (`SV_NextDownload_f`-style sized transfer), retargeted at the
// single-header-plus-content framing of spec.md §4.11/§6 `IncomingFile`.

use std::path::PathBuf;

use zone_common::error::{ZoneError, ZoneResult};
use zone_proto::s2c::S2cIncomingFile;

use crate::player::PlayerId;

pub struct FileSendRequest {
    pub player: PlayerId,
    pub source_path: PathBuf,
    pub display_name: String,
    pub delete_after: bool,
}

/// spec.md §4.11: "length file_size + 17 whose first 17 bytes are
/// IncomingFile header + 16-byte name, followed by file bytes."
pub struct PreparedFileSend {
    pub player: PlayerId,
    pub packet: S2cIncomingFile,
    pub source_path: PathBuf,
    pub delete_after: bool,
}

impl PreparedFileSend {
    pub fn total_len(&self) -> usize {
        self.packet.encode().len()
    }
}

/// spec.md §4.11 "Given (player, source path, display name <=16 chars,
/// delete-after?): open the file, enqueue a sized transfer". Reads the
/// file eagerly; the transport's sized-send executor (out of scope
/// here) is what actually streams it.
pub fn prepare_file_send(request: &FileSendRequest) -> ZoneResult<PreparedFileSend> {
    let content = std::fs::read(&request.source_path)
        .map_err(|e| ZoneError::Resource(format!("opening {}: {e}", request.source_path.display())))?;

    let packet = S2cIncomingFile::new(&request.display_name, content);
    Ok(PreparedFileSend {
        player: request.player,
        packet,
        source_path: request.source_path.clone(),
        delete_after: request.delete_after,
    })
}

/// spec.md §4.11 "On completion, close; if delete-after, delete the
/// source." Called once the transport confirms the send finished.
pub fn complete_file_send(send: &PreparedFileSend) -> ZoneResult<()> {
    if send.delete_after {
        std::fs::remove_file(&send.source_path)
            .map_err(|e| ZoneError::Resource(format!("deleting {}: {e}", send.source_path.display())))?;
    }
    Ok(())
}

pub fn truncate_display_name(name: &str) -> String {
    name.chars().take(16).collect()
}
