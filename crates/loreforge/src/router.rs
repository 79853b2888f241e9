//! The message router: decode, mutate, fan out.
//!
//! Every inbound frame goes through [`dispatch`]: decode the tagged
//! envelope (falling back to the legacy positional form), build a
//! [`CallContext`], and run the handler for that message kind. Each
//! kind maps to exactly one broadcast policy:
//!
//! - effect only (asset puts, z-order reorders that broadcast derived
//!   per-token messages instead of the original),
//! - mutate then reply to the sender only (`getZone`, `getAsset`),
//! - mutate then forward to everyone except the sender (most ops),
//! - broadcast first, then mutate (`draw`, `undoDraw`),
//! - broadcast to everyone including the sender (pointers, zone flags,
//!   initiative).
//!
//! The campaign mutex is held only around the mutation, never across a
//! send. Handler errors are logged with the method name and never kill
//! the connection's read loop.

use loreforge_model::{
    Board, DrawnElement, ExposedAreaMeta, TokenUpdate, Zone, ZoneId,
};
use loreforge_protocol::mapper::{
    area_to_region, pen_to_model, drawable_to_model, policy_to_model,
    topology_to_model,
};
use loreforge_protocol::{
    legacy, Codec, LegacyCall, Message, ProtocolError,
};
use loreforge_model::Asset;
use loreforge_transport::ClientId;

use crate::context::CallContext;
use crate::server::ServerState;
use crate::LoreforgeError;

/// Decodes and handles one inbound frame.
///
/// Never returns an error: anything that goes wrong is logged and the
/// caller's read loop continues.
pub async fn dispatch<C: Codec + Clone>(
    state: &ServerState<C>,
    sender: ClientId,
    raw: &[u8],
) {
    let message = match decode_envelope(state, raw) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(%sender, error = %e, "undecodable message, dropping");
            return;
        }
    };

    let ctx = CallContext::new(sender, message.kind(), raw.to_vec());
    tracing::trace!(%sender, method = ctx.method, "dispatching");

    if let Err(e) = handle(state, &ctx, message).await {
        tracing::error!(
            %sender,
            method = ctx.method,
            error = %e,
            "handler failed"
        );
    }
}

/// Tagged envelope first; legacy positional call as the fallback.
///
/// A frame that parses as neither form reports the envelope error; a
/// legacy call with a bad method or arguments reports the typed
/// [`CallError`](loreforge_protocol::CallError).
fn decode_envelope<C: Codec>(
    state: &ServerState<C>,
    raw: &[u8],
) -> Result<Message, ProtocolError> {
    let envelope_err = match state.codec.decode::<Message>(raw) {
        Ok(message) => return Ok(message),
        Err(e) => e,
    };
    let Ok(call) = state.codec.decode::<LegacyCall>(raw) else {
        return Err(envelope_err);
    };
    tracing::debug!(method = %call.method, "legacy call form");
    Ok(legacy::decode(&call)?)
}

/// Runs one zone mutation under the campaign lock.
///
/// A vanished zone is a safe no-op (`None`): in a distributed session
/// state can legitimately disappear between a client sending a message
/// and the server applying it.
async fn with_zone<C: Codec, R>(
    state: &ServerState<C>,
    zone_id: ZoneId,
    f: impl FnOnce(&mut Zone) -> R,
) -> Option<R> {
    let mut campaign = state.campaign.lock().await;
    match campaign.zone_mut(zone_id) {
        Some(zone) => Some(f(zone)),
        None => {
            tracing::debug!(%zone_id, "zone vanished, skipping mutation");
            None
        }
    }
}

async fn handle<C: Codec + Clone>(
    state: &ServerState<C>,
    ctx: &CallContext,
    message: Message,
) -> Result<(), LoreforgeError> {
    let sender = ctx.sender;
    let fan = &state.broadcaster;

    match message {
        // Accepted and ignored; it only proves the connection is alive.
        Message::Heartbeat => {}

        // --- campaign: mutate, forward to everyone else -------------
        Message::SetCampaign { campaign } => {
            *state.campaign.lock().await = *campaign;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::SetCampaignName { name } => {
            state.campaign.lock().await.name = name;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::UpdateCampaign { properties } => {
            state.campaign.lock().await.properties = properties;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::UpdateCampaignMacros { macros } => {
            state.campaign.lock().await.campaign_macros = macros;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::UpdateGmMacros { macros } => {
            state.campaign.lock().await.gm_macros = macros;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::SetServerPolicy { policy } => {
            *state.policy.lock().await = policy_to_model(&policy);
            fan.forward_except(sender, &ctx.raw).await;
        }

        // Stateless forwards: the server routes these, clients act.
        Message::BootPlayer { .. }
        | Message::Message { .. }
        | Message::ExecFunction { .. }
        | Message::ExecLink { .. }
        | Message::SetLiveTypingLabel { .. }
        | Message::EnforceNotification { .. }
        | Message::EnforceZone { .. }
        | Message::EnforceZoneView { .. }
        | Message::RestoreZoneView { .. }
        | Message::StartTokenMove { .. }
        | Message::UpdateTokenMove { .. }
        | Message::ToggleTokenMoveWaypoint { .. }
        | Message::StopTokenMove { .. }
        | Message::AddAddOnLibrary { .. }
        | Message::RemoveAddOnLibrary { .. }
        | Message::RemoveAllAddOnLibraries => {
            fan.forward_except(sender, &ctx.raw).await;
        }

        // --- shared data store --------------------------------------
        Message::UpdateDataStore { store } => {
            state.campaign.lock().await.data = store;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::UpdateData {
            data_type,
            namespace,
            key,
            value,
        } => {
            state
                .campaign
                .lock()
                .await
                .data
                .set(data_type, namespace, key, value);
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RemoveDataStore => {
            state.campaign.lock().await.data.clear();
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RemoveDataNamespace {
            data_type,
            namespace,
        } => {
            state
                .campaign
                .lock()
                .await
                .data
                .remove_namespace(&data_type, &namespace);
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RemoveData {
            data_type,
            namespace,
            key,
        } => {
            state
                .campaign
                .lock()
                .await
                .data
                .remove(&data_type, &namespace, &key);
            fan.forward_except(sender, &ctx.raw).await;
        }

        // --- zones --------------------------------------------------
        Message::GetZone { zone_id } => {
            let zone = state
                .campaign
                .lock()
                .await
                .zone(zone_id)
                .cloned();
            match zone {
                Some(zone) => {
                    fan.reply_to(
                        sender,
                        &Message::PutZone {
                            zone: Box::new(zone),
                        },
                    )
                    .await?;
                }
                None => {
                    tracing::debug!(%zone_id, "getZone for unknown zone");
                }
            }
        }
        Message::PutZone { zone } => {
            state.campaign.lock().await.put_zone(*zone);
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RemoveZone { zone_id } => {
            state.campaign.lock().await.remove_zone(zone_id);
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RenameZone { zone_id, name } => {
            with_zone(state, zone_id, |zone| zone.name = name).await;
            fan.forward_all(&ctx.raw).await;
        }
        Message::ChangeZoneDisplayName { zone_id, name } => {
            with_zone(state, zone_id, |zone| {
                zone.player_alias = Some(name);
            })
            .await;
            fan.forward_all(&ctx.raw).await;
        }
        Message::SetZoneVisibility { zone_id, visible } => {
            with_zone(state, zone_id, |zone| zone.visible = visible).await;
            fan.forward_all(&ctx.raw).await;
        }
        Message::SetZoneHasFow { zone_id, has_fog } => {
            with_zone(state, zone_id, |zone| zone.has_fog = has_fog).await;
            fan.forward_all(&ctx.raw).await;
        }
        Message::SetVisionType { zone_id, vision } => {
            with_zone(state, zone_id, |zone| zone.vision = vision).await;
            fan.forward_all(&ctx.raw).await;
        }
        Message::SetZoneGridSize {
            zone_id,
            offset_x,
            offset_y,
            size,
            color,
        } => {
            with_zone(state, zone_id, |zone| {
                zone.grid.offset_x = offset_x;
                zone.grid.offset_y = offset_y;
                zone.grid.size = size;
                zone.grid_color = color;
            })
            .await;
            fan.forward_all(&ctx.raw).await;
        }
        Message::SetBoard { zone_id, asset, x, y } => {
            with_zone(state, zone_id, |zone| {
                zone.board = Some(Board { asset, x, y });
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }

        // --- tokens -------------------------------------------------
        Message::PutToken { zone_id, token } => {
            put_token(state, ctx, zone_id, *token).await?;
        }
        Message::EditToken { zone_id, token } => {
            with_zone(state, zone_id, |zone| {
                zone.tokens.insert(token.id, *token);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RemoveToken { zone_id, token_id } => {
            with_zone(state, zone_id, |zone| {
                zone.remove_token(token_id);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RemoveTokens { zone_id, token_ids } => {
            with_zone(state, zone_id, |zone| {
                zone.remove_tokens(&token_ids);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::UpdateTokenProperty {
            zone_id,
            token_id,
            update,
        } => {
            if apply_token_update(state, zone_id, token_id, &update).await
            {
                fan.forward_except(sender, &ctx.raw).await;
            }
        }
        Message::SetTokenLocation {
            zone_id,
            token_id,
            x,
            y,
        } => {
            with_zone(state, zone_id, |zone| {
                if let Some(token) = zone.token_mut(token_id) {
                    token.x = x;
                    token.y = y;
                }
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }

        // Reorders broadcast derived full tokens to ALL clients (the
        // sender included) instead of the original message, so every
        // replica converges on the server's assignment.
        Message::BringTokensToFront { zone_id, token_ids } => {
            let moved = with_zone(state, zone_id, |zone| {
                zone.bring_to_front(&token_ids)
            })
            .await
            .unwrap_or_default();
            for token in moved {
                fan.broadcast_all(&Message::PutToken {
                    zone_id,
                    token: Box::new(token),
                })
                .await?;
            }
        }
        Message::SendTokensToBack { zone_id, token_ids } => {
            let moved = with_zone(state, zone_id, |zone| {
                zone.send_to_back(&token_ids)
            })
            .await
            .unwrap_or_default();
            for token in moved {
                fan.broadcast_all(&Message::PutToken {
                    zone_id,
                    token: Box::new(token),
                })
                .await?;
            }
        }

        // --- labels -------------------------------------------------
        Message::PutLabel { zone_id, label } => {
            with_zone(state, zone_id, |zone| zone.put_label(label)).await;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RemoveLabel { zone_id, label_id } => {
            with_zone(state, zone_id, |zone| {
                zone.remove_label(label_id);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }

        // --- drawing ------------------------------------------------
        // Draws broadcast BEFORE applying: every client (sender
        // included, for undo bookkeeping) sees the stroke in arrival
        // order, then the server appends its own copy.
        Message::Draw {
            zone_id,
            id,
            layer,
            pen,
            drawable,
        } => {
            fan.forward_all(&ctx.raw).await;
            if let Some(drawable) = drawable_to_model(&drawable) {
                let element = DrawnElement {
                    id,
                    layer,
                    drawable,
                    pen: pen_to_model(&pen),
                };
                with_zone(state, zone_id, |zone| {
                    zone.add_drawable(element);
                })
                .await;
            }
        }
        Message::UpdateDrawing {
            zone_id,
            id,
            layer,
            pen,
            drawable,
        } => {
            fan.forward_all(&ctx.raw).await;
            if let Some(drawable) = drawable_to_model(&drawable) {
                let element = DrawnElement {
                    id,
                    layer,
                    drawable,
                    pen: pen_to_model(&pen),
                };
                with_zone(state, zone_id, |zone| {
                    zone.update_drawable(element);
                })
                .await;
            }
        }
        Message::UndoDraw {
            zone_id,
            drawable_id,
        } => {
            fan.forward_all(&ctx.raw).await;
            with_zone(state, zone_id, |zone| {
                zone.remove_drawable(drawable_id);
            })
            .await;
        }
        Message::ClearAllDrawings { zone_id, layer } => {
            let removed = with_zone(state, zone_id, |zone| {
                zone.clear_drawables(layer).len()
            })
            .await;
            if let Some(removed) = removed {
                tracing::debug!(%zone_id, removed, "cleared layer");
            }
            fan.forward_all(&ctx.raw).await;
        }

        // --- fog of war ---------------------------------------------
        Message::ExposeFow {
            zone_id,
            area,
            token_ids,
        } => {
            let region = area_to_region(&area);
            with_zone(state, zone_id, |zone| {
                zone.expose_area(&region, &token_ids);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::HideFow {
            zone_id,
            area,
            token_ids,
        } => {
            let region = area_to_region(&area);
            with_zone(state, zone_id, |zone| {
                zone.hide_area(&region, &token_ids);
            })
            .await;
            fan.forward_all(&ctx.raw).await;
        }
        Message::SetFow {
            zone_id,
            area,
            token_ids,
        } => {
            let region = area_to_region(&area);
            with_zone(state, zone_id, |zone| {
                zone.set_fog_area(region, &token_ids);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }
        // Exposure from character vision is computed client-side; the
        // server only relays the trigger.
        Message::ExposePcArea { .. } => {
            fan.forward_all(&ctx.raw).await;
        }
        Message::ClearExposedArea {
            zone_id,
            global_only,
        } => {
            with_zone(state, zone_id, |zone| {
                zone.clear_exposed_area(global_only);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::UpdateExposedAreaMeta {
            zone_id,
            token_id,
            area,
        } => {
            let meta = ExposedAreaMeta {
                exposed: area_to_region(&area),
            };
            with_zone(state, zone_id, |zone| {
                zone.set_exposed_area_meta(token_id, meta);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }

        // --- topology -----------------------------------------------
        Message::AddTopology {
            zone_id,
            area,
            topology_type,
        } => {
            let Some(kind) = topology_to_model(topology_type) else {
                return Ok(());
            };
            let region = area_to_region(&area);
            with_zone(state, zone_id, |zone| {
                zone.add_topology(&region, kind);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }
        Message::RemoveTopology {
            zone_id,
            area,
            topology_type,
        } => {
            let Some(kind) = topology_to_model(topology_type) else {
                return Ok(());
            };
            let region = area_to_region(&area);
            with_zone(state, zone_id, |zone| {
                zone.remove_topology(&region, kind);
            })
            .await;
            fan.forward_except(sender, &ctx.raw).await;
        }

        // --- initiative ---------------------------------------------
        Message::UpdateInitiative { zone_id, list } => {
            with_zone(state, zone_id, |zone| zone.initiative = list).await;
            fan.forward_all(&ctx.raw).await;
        }
        Message::UpdateTokenInitiative {
            zone_id,
            token_id,
            holding,
            state: init_state,
            index,
        } => {
            with_zone(state, zone_id, |zone| {
                zone.initiative
                    .update_entry(token_id, holding, init_state, index);
            })
            .await;
            fan.forward_all(&ctx.raw).await;
        }

        // --- pointers: ephemeral, everyone sees them ----------------
        Message::ShowPointer { .. }
        | Message::MovePointer { .. }
        | Message::HidePointer { .. } => {
            fan.forward_all(&ctx.raw).await;
        }

        // --- assets -------------------------------------------------
        Message::PutAsset { asset } => {
            let key = state.assets.lock().await.put(asset);
            tracing::debug!(%key, "asset stored");
        }
        Message::RemoveAsset { key } => {
            state.assets.lock().await.remove(&key);
        }
        Message::GetAsset { key } => {
            let asset = state.assets.lock().await.get(&key).cloned();
            match asset {
                Some(asset) => {
                    let header =
                        state.transfers.lock().await.begin(sender, asset);
                    fan.reply_to(
                        sender,
                        &Message::StartAssetTransfer { header },
                    )
                    .await?;
                }
                None => {
                    // Unknown asset: answer directly with a placeholder
                    // under the requested key so the client stops asking.
                    tracing::debug!(%key, "unknown asset requested");
                    fan.reply_to(
                        sender,
                        &Message::PutAsset {
                            asset: Asset::broken_image(key),
                        },
                    )
                    .await?;
                }
            }
        }
        Message::RequestAssetChunk { key } => {
            let chunk =
                state.transfers.lock().await.next_chunk(sender, key);
            match chunk {
                Ok(chunk) => {
                    fan.reply_to(
                        sender,
                        &Message::UpdateAssetTransfer { chunk },
                    )
                    .await?;
                }
                Err(e) => {
                    // Fail closed: no producer is ever resurrected for
                    // a stale pull.
                    tracing::warn!(%sender, %key, error = %e, "stale chunk pull");
                }
            }
        }

        // Server-to-client frames; a client sending one is a bug on
        // its side.
        Message::StartAssetTransfer { .. }
        | Message::UpdateAssetTransfer { .. } => {
            tracing::warn!(
                %sender,
                method = ctx.method,
                "client sent a server-only message, ignoring"
            );
        }
    }

    Ok(())
}

/// Token upsert with the z-order split reply.
///
/// A brand-new token gets its z-order assigned server-side; the sender
/// already has the token locally, so it is answered with only the
/// z-order delta while everyone else receives the full token.
async fn put_token<C: Codec + Clone>(
    state: &ServerState<C>,
    ctx: &CallContext,
    zone_id: ZoneId,
    token: loreforge_model::Token,
) -> Result<(), LoreforgeError> {
    use loreforge_model::PutTokenOutcome;

    let token_id = token.id;
    let outcome = with_zone(state, zone_id, |zone| {
        let outcome = zone.put_token(token);
        let stored = zone.token(token_id).cloned();
        (outcome, stored)
    })
    .await;

    let Some((outcome, stored)) = outcome else {
        return Ok(());
    };

    match outcome {
        PutTokenOutcome::Added { z_order } => {
            state
                .broadcaster
                .reply_to(
                    ctx.sender,
                    &Message::UpdateTokenProperty {
                        zone_id,
                        token_id,
                        update: TokenUpdate::set_z_order(z_order),
                    },
                )
                .await?;
            if let Some(token) = stored {
                state
                    .broadcaster
                    .broadcast_except(
                        ctx.sender,
                        &Message::PutToken {
                            zone_id,
                            token: Box::new(token),
                        },
                    )
                    .await?;
            }
        }
        PutTokenOutcome::Replaced => {
            state
                .broadcaster
                .forward_except(ctx.sender, &ctx.raw)
                .await;
        }
    }
    Ok(())
}

/// Applies a token update. Returns `false` when the update must not be
/// forwarded (malformed arguments).
async fn apply_token_update<C: Codec>(
    state: &ServerState<C>,
    zone_id: ZoneId,
    token_id: loreforge_model::TokenId,
    update: &TokenUpdate,
) -> bool {
    let result = with_zone(state, zone_id, |zone| {
        match zone.token_mut(token_id) {
            Some(token) => token.apply_update(update),
            // Vanished token: nothing to apply, still safe to route.
            None => Ok(()),
        }
    })
    .await;

    match result {
        Some(Err(e)) => {
            tracing::warn!(%zone_id, %token_id, error = %e, "bad token update");
            false
        }
        _ => true,
    }
}
